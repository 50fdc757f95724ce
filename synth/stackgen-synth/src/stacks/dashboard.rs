use serde_json::{Map, Value, json};
use stackgen_models::{DashboardSpec, MetricSpec, Statistic};

use crate::template::escape_sub;

/// Grid width of a dashboard.
pub const DASHBOARD_COLUMNS: u32 = 24;

pub const SERVICE_NAME_VAR: &str = "ServiceName";
pub const CLUSTER_NAME_VAR: &str = "ClusterName";
pub const TARGET_GROUP_VAR: &str = "TargetGroup";
pub const LOAD_BALANCER_VAR: &str = "LoadBalancer";

#[derive(Debug, Clone, PartialEq)]
pub enum DimensionValue {
    Literal(String),
    /// Filled in at deploy time through an `Fn::Sub` variable.
    Var(&'static str),
}

impl DimensionValue {
    fn render(&self) -> String {
        match self {
            DimensionValue::Literal(text) => escape_sub(text),
            DimensionValue::Var(name) => format!("${{{}}}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricLine {
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: Vec<(String, DimensionValue)>,
    pub statistic: Statistic,
    pub period_secs: u32,
    pub label: Option<String>,
    pub color: Option<String>,
}

impl MetricLine {
    pub fn new(namespace: &str, metric_name: &str, statistic: Statistic, period_secs: u32) -> Self {
        Self {
            namespace: namespace.to_string(),
            metric_name: metric_name.to_string(),
            dimensions: Vec::new(),
            statistic,
            period_secs,
            label: None,
            color: None,
        }
    }

    pub fn dimension(mut self, name: &str, value: DimensionValue) -> Self {
        self.dimensions.push((name.to_string(), value));
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    fn render(&self, right_axis: bool) -> Value {
        let mut row = vec![
            Value::String(escape_sub(&self.namespace)),
            Value::String(escape_sub(&self.metric_name)),
        ];
        for (name, value) in &self.dimensions {
            row.push(Value::String(escape_sub(name)));
            row.push(Value::String(value.render()));
        }
        let mut options = Map::new();
        options.insert("stat".into(), json!(self.statistic.to_string()));
        options.insert("period".into(), json!(self.period_secs));
        if let Some(label) = &self.label {
            options.insert("label".into(), json!(escape_sub(label)));
        }
        if let Some(color) = &self.color {
            options.insert("color".into(), json!(color));
        }
        if right_axis {
            options.insert("yAxis".into(), json!("right"));
        }
        row.push(Value::Object(options));
        Value::Array(row)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphWidget {
    pub title: String,
    pub left: Vec<MetricLine>,
    pub right: Vec<MetricLine>,
    pub stacked: bool,
    pub left_min: Option<f64>,
    pub width: u32,
    pub height: u32,
}

impl GraphWidget {
    pub fn new(title: &str, left: Vec<MetricLine>) -> Self {
        Self {
            title: title.to_string(),
            left,
            right: Vec::new(),
            stacked: false,
            left_min: None,
            width: 6,
            height: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    Text { markdown: String, width: u32, height: u32 },
    Graph(GraphWidget),
}

impl Widget {
    pub fn text(markdown: &str) -> Self {
        Widget::Text {
            markdown: markdown.to_string(),
            width: DASHBOARD_COLUMNS,
            height: 2,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        match self {
            Widget::Text { width, height, .. } => (*width, *height),
            Widget::Graph(g) => (g.width, g.height),
        }
    }

    fn render(&self, x: u32, y: u32, region: &str) -> Value {
        let (width, height) = self.size();
        match self {
            Widget::Text { markdown, .. } => json!({
                "type": "text",
                "x": x,
                "y": y,
                "width": width,
                "height": height,
                "properties": { "markdown": escape_sub(markdown) },
            }),
            Widget::Graph(graph) => {
                let metrics: Vec<Value> = graph
                    .left
                    .iter()
                    .map(|m| m.render(false))
                    .chain(graph.right.iter().map(|m| m.render(true)))
                    .collect();
                let mut properties = json!({
                    "view": "timeSeries",
                    "title": escape_sub(&graph.title),
                    "region": region,
                    "stacked": graph.stacked,
                    "metrics": metrics,
                });
                if let Some(min) = graph.left_min {
                    properties["yAxis"] = json!({ "left": { "min": min } });
                }
                json!({
                    "type": "metric",
                    "x": x,
                    "y": y,
                    "width": width,
                    "height": height,
                    "properties": properties,
                })
            }
        }
    }
}

/// Widgets laid out row by row on a 24-column grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dashboard {
    rows: Vec<Vec<Widget>>,
}

impl Dashboard {
    pub fn add_row(&mut self, widgets: Vec<Widget>) {
        self.rows.push(widgets);
    }

    pub fn rows(&self) -> &[Vec<Widget>] {
        &self.rows
    }

    /// Body JSON meant for `Fn::Sub`. Literal text is escaped; dimension
    /// variables and `${AWS::Region}` are left for substitution.
    pub fn body(&self) -> String {
        let region = "${AWS::Region}";
        let mut widgets = Vec::new();
        let mut y = 0;
        for row in &self.rows {
            let mut x = 0;
            let mut row_height = 0;
            for widget in row {
                let (width, height) = widget.size();
                if x + width > DASHBOARD_COLUMNS && x > 0 {
                    y += row_height;
                    x = 0;
                    row_height = 0;
                }
                widgets.push(widget.render(x, y, region));
                x += width;
                row_height = row_height.max(height);
            }
            y += row_height;
        }
        json!({ "widgets": widgets }).to_string()
    }
}

fn service_dimensions(line: MetricLine) -> MetricLine {
    line.dimension(SERVICE_NAME_VAR, DimensionValue::Var(SERVICE_NAME_VAR))
        .dimension(CLUSTER_NAME_VAR, DimensionValue::Var(CLUSTER_NAME_VAR))
}

fn balancer_dimensions(line: MetricLine) -> MetricLine {
    line.dimension(TARGET_GROUP_VAR, DimensionValue::Var(TARGET_GROUP_VAR))
        .dimension(LOAD_BALANCER_VAR, DimensionValue::Var(LOAD_BALANCER_VAR))
}

/// Banner, traffic and utilization rows for one load balanced service.
pub fn service_dashboard(app: &str, spec: &DashboardSpec, scaling_metric: &MetricSpec) -> Dashboard {
    let period = spec.period_secs;
    let mut dashboard = Dashboard::default();
    dashboard.add_row(vec![Widget::text(&spec.title)]);

    let mut task_count = GraphWidget::new(
        &format!("{} Task Count", app),
        vec![service_dimensions(
            MetricLine::new(
                "ECS/ContainerInsights",
                "RunningTaskCount",
                Statistic::Average,
                period,
            )
            .label("Running"),
        )],
    );
    task_count.width = 8;
    task_count.left_min = Some(0.0);

    let mut requests = GraphWidget::new(
        "ReqCountPerTarget",
        vec![balancer_dimensions(
            MetricLine::new(
                "AWS/ApplicationELB",
                "RequestCountPerTarget",
                Statistic::Sum,
                period,
            )
            .color("#98df8a"),
        )],
    );
    requests.stacked = true;

    let mut custom = MetricLine::new(
        &scaling_metric.namespace,
        &scaling_metric.metric_name,
        scaling_metric.statistic,
        period,
    )
    .color("#d62728");
    for (name, value) in &scaling_metric.dimensions {
        custom = custom.dimension(name, DimensionValue::Literal(value.clone()));
    }
    let custom = GraphWidget::new("Custom Metric", vec![custom]);

    dashboard.add_row(vec![
        Widget::Graph(task_count),
        Widget::Graph(requests),
        Widget::Graph(custom),
    ]);

    let mut cpu = GraphWidget::new(
        &format!("{} Task CPU", app),
        vec![service_dimensions(
            MetricLine::new("AWS/ECS", "CPUUtilization", Statistic::Average, period)
                .label("CPUUtilization"),
        )],
    );
    cpu.right = vec![service_dimensions(
        MetricLine::new("AWS/ECS", "MemoryUtilization", Statistic::Average, period)
            .label("MemoryUtilization"),
    )];
    cpu.width = 8;
    cpu.left_min = Some(0.0);

    let mut latency = GraphWidget::new(
        "TargetResponseTime (P95)",
        vec![balancer_dimensions(
            MetricLine::new(
                "AWS/ApplicationELB",
                "TargetResponseTime",
                Statistic::Percentile(95.0),
                period,
            )
            .color("#2ca02c"),
        )],
    );
    latency.stacked = true;

    dashboard.add_row(vec![Widget::Graph(cpu), Widget::Graph(latency)]);
    dashboard
}
