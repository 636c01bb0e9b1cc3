//! Artifact file naming.
//!
//! Every file a scenario produces is named from one base path
//! (`<output>/<name>`): `<name>.tr`, `<name>-<node>-<device>.pcap`,
//! `<name>.routes`, `<name>.neighbor`, plus the exported
//! `<name>.scenario.yaml` and `<name>.addresses.json`.

use std::path::{Path, PathBuf};

/// File locations for one scenario run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    base: PathBuf,
}

impl ArtifactPaths {
    pub fn new(output_dir: impl AsRef<Path>, name: &str) -> Self {
        Self {
            base: output_dir.as_ref().join(name),
        }
    }

    /// Base path without extension; also the pcap prefix
    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn ascii_trace(&self) -> PathBuf {
        self.with_suffix(".tr")
    }

    pub fn routes(&self) -> PathBuf {
        self.with_suffix(".routes")
    }

    pub fn neighbor(&self) -> PathBuf {
        self.with_suffix(".neighbor")
    }

    pub fn scenario(&self) -> PathBuf {
        self.with_suffix(".scenario.yaml")
    }

    pub fn addresses(&self) -> PathBuf {
        self.with_suffix(".addresses.json")
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        suffix_path(&self.base, suffix)
    }
}

/// Per-device capture file: `<prefix>-<node>-<device>.pcap`
pub fn pcap_file(prefix: &Path, node: u32, device: u32) -> PathBuf {
    suffix_path(prefix, &format!("-{}-{}.pcap", node, device))
}

// Appends to the file name instead of using `set_extension`, which would eat
// anything after a dot in the scenario name.
fn suffix_path(base: &Path, suffix: &str) -> PathBuf {
    let mut raw = base.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_names() {
        let paths = ArtifactPaths::new("out", "dsdv");
        assert_eq!(paths.ascii_trace(), PathBuf::from("out/dsdv.tr"));
        assert_eq!(paths.routes(), PathBuf::from("out/dsdv.routes"));
        assert_eq!(paths.neighbor(), PathBuf::from("out/dsdv.neighbor"));
        assert_eq!(paths.scenario(), PathBuf::from("out/dsdv.scenario.yaml"));
        assert_eq!(paths.addresses(), PathBuf::from("out/dsdv.addresses.json"));
        assert_eq!(pcap_file(paths.base(), 3, 0), PathBuf::from("out/dsdv-3-0.pcap"));
    }

    #[test]
    fn test_dotted_name_is_preserved() {
        let paths = ArtifactPaths::new("out", "run.v2");
        assert_eq!(paths.routes(), PathBuf::from("out/run.v2.routes"));
    }
}
