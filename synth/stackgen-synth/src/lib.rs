pub mod app;
pub mod assembly;
pub mod assets;
pub mod error;
pub mod lint;
pub mod naming;
pub mod parameters;
pub mod stacks;
pub mod template;

pub use app::{App, SynthOptions};
pub use assembly::{CloudAssembly, MANIFEST_FILE, Manifest, SynthesizedStack};
pub use assets::{ImageAsset, ResolvedImage};
pub use error::SynthError;
pub use lint::{Finding, Severity, lint};
pub use parameters::{DeclaredParameters, ParameterStore, ResolvedParameter};
pub use stacks::{DatabaseOutputs, NetworkOutputs, StackDescriptor};
pub use template::{Resource, Template, Token};
