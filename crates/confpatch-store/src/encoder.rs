use crate::error::{StoreError, StoreResult};
use crate::item::ConfigItem;

/// Converts a configuration item into canonical text.
///
/// Implementations must be deterministic: the same item always encodes to
/// the same bytes, with stable key ordering.
pub trait Encoder: Send + Sync {
    fn encode(&self, item: &ConfigItem) -> StoreResult<String>;
}

/// YAML block-style encoder.
///
/// Keys are emitted in the item's insertion order. An empty item encodes to
/// the empty string so that it hashes and diffs as absent content.
#[derive(Clone, Copy, Debug, Default)]
pub struct YamlEncoder;

impl Encoder for YamlEncoder {
    fn encode(&self, item: &ConfigItem) -> StoreResult<String> {
        if item.is_empty() {
            return Ok(String::new());
        }
        serde_yaml::to_string(item).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}
