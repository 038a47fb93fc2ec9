use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Remote storage backend types
///
/// This enum defines the object-storage providers the remote adapter can talk to.
/// It's defined in core because it's used in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteBackend {
    S3,
    Memory,
}

impl FromStr for RemoteBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s3" => Ok(RemoteBackend::S3),
            "memory" | "in-memory" | "inmemory" => Ok(RemoteBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid remote backend: {}", s)),
        }
    }
}

impl Display for RemoteBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RemoteBackend::S3 => write!(f, "s3"),
            RemoteBackend::Memory => write!(f, "memory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_backends() {
        assert_eq!("s3".parse::<RemoteBackend>().unwrap(), RemoteBackend::S3);
        assert_eq!("S3".parse::<RemoteBackend>().unwrap(), RemoteBackend::S3);
        assert_eq!(
            "memory".parse::<RemoteBackend>().unwrap(),
            RemoteBackend::Memory
        );
    }

    #[test]
    fn rejects_unknown_backend() {
        assert!("nfs".parse::<RemoteBackend>().is_err());
    }
}
