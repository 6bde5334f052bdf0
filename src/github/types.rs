pub const MANIFEST_PATH: &str = ".pre-commit-hooks.yaml";

/// What the contents API reported at [`MANIFEST_PATH`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestLookup {
    File { size: u64 },
    Directory,
    Missing,
}
