/// Vendor extension set on unused components when no `--tag` is given
pub const DEFAULT_TAG: &str = "x-unused";
