use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::ValidationError;

/// Smallest subnet the provider accepts inside a VPC.
pub const MAX_SUBNET_PREFIX: u8 = 28;

/// Largest VPC block the provider accepts.
pub const MIN_VPC_PREFIX: u8 = 16;

/// An IPv4 network block such as `10.0.0.0/16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ipv4Cidr {
    network: Ipv4Addr,
    prefix: u8,
}

impl Ipv4Cidr {
    pub fn new(network: Ipv4Addr, prefix: u8) -> Result<Self, ValidationError> {
        if prefix > 32 {
            return Err(ValidationError::InvalidCidr(format!(
                "{}/{}",
                network, prefix
            )));
        }
        let bits = u32::from(network);
        if bits & !mask(prefix) != 0 {
            return Err(ValidationError::InvalidCidr(format!(
                "{}/{} has host bits set",
                network, prefix
            )));
        }
        Ok(Self { network, prefix })
    }

    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    fn first(&self) -> u32 {
        u32::from(self.network)
    }

    fn last(&self) -> u32 {
        self.first() | !mask(self.prefix)
    }

    pub fn contains(&self, other: &Ipv4Cidr) -> bool {
        other.prefix >= self.prefix
            && other.first() >= self.first()
            && other.last() <= self.last()
    }

    pub fn overlaps(&self, other: &Ipv4Cidr) -> bool {
        self.first() <= other.last() && other.first() <= self.last()
    }

    /// Carve `count` equally sized blocks out of this one, in address order.
    ///
    /// The block size is the largest that fits `count` blocks, i.e. the prefix
    /// grows by `ceil(log2(count))` bits.
    pub fn split(&self, count: usize) -> Result<Vec<Ipv4Cidr>, ValidationError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let new_prefix = u32::from(self.prefix) + ceil_log2(count);
        if new_prefix > u32::from(MAX_SUBNET_PREFIX) {
            return Err(ValidationError::AddressSpaceExhausted {
                cidr: self.to_string(),
                subnets: count,
            });
        }
        let new_prefix = new_prefix as u8;
        let step = 1u32 << (32 - new_prefix);
        (0..count as u32)
            .map(|i| {
                Ipv4Cidr::new(
                    Ipv4Addr::from(self.first() + i * step),
                    new_prefix,
                )
            })
            .collect()
    }
}

fn mask(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    }
}

fn ceil_log2(n: usize) -> u32 {
    if n <= 1 {
        0
    } else {
        usize::BITS - (n - 1).leading_zeros()
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

impl FromStr for Ipv4Cidr {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, prefix) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| ValidationError::InvalidCidr(s.to_string()))?;
        let network: Ipv4Addr = addr
            .parse()
            .map_err(|_| ValidationError::InvalidCidr(s.to_string()))?;
        let prefix: u8 = prefix
            .parse()
            .map_err(|_| ValidationError::InvalidCidr(s.to_string()))?;
        Ipv4Cidr::new(network, prefix)
    }
}

/// `validator` hook for string fields holding a CIDR block.
pub fn validate_cidr(value: &str) -> Result<(), validator::ValidationError> {
    value
        .parse::<Ipv4Cidr>()
        .map(|_| ())
        .map_err(|e| crate::validation::invalid("cidr", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays() {
        let cidr: Ipv4Cidr = "10.0.0.0/16".parse().unwrap();
        assert_eq!(cidr.prefix(), 16);
        assert_eq!(cidr.to_string(), "10.0.0.0/16");
    }

    #[test]
    fn rejects_host_bits_and_garbage() {
        assert!("10.0.0.1/16".parse::<Ipv4Cidr>().is_err());
        assert!("10.0.0.0".parse::<Ipv4Cidr>().is_err());
        assert!("10.0.0.0/33".parse::<Ipv4Cidr>().is_err());
        assert!("nope/8".parse::<Ipv4Cidr>().is_err());
    }

    #[test]
    fn split_six_ways_uses_slash_19() {
        let vpc: Ipv4Cidr = "10.0.0.0/16".parse().unwrap();
        let blocks = vpc.split(6).unwrap();
        let rendered: Vec<String> =
            blocks.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "10.0.0.0/19",
                "10.0.32.0/19",
                "10.0.64.0/19",
                "10.0.96.0/19",
                "10.0.128.0/19",
                "10.0.160.0/19",
            ]
        );
    }

    #[test]
    fn split_blocks_are_disjoint_and_contained() {
        let vpc: Ipv4Cidr = "172.16.0.0/20".parse().unwrap();
        for count in 1..=6 {
            let blocks = vpc.split(count).unwrap();
            assert_eq!(blocks.len(), count);
            for (i, a) in blocks.iter().enumerate() {
                assert!(vpc.contains(a));
                for b in blocks.iter().skip(i + 1) {
                    assert!(!a.overlaps(b), "{a} overlaps {b}");
                }
            }
        }
    }

    #[test]
    fn split_refuses_blocks_below_minimum_size() {
        let small: Ipv4Cidr = "10.0.0.0/27".parse().unwrap();
        assert!(matches!(
            small.split(4),
            Err(ValidationError::AddressSpaceExhausted { .. })
        ));
    }
}
