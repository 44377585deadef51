use {
    crate::domain::eth,
    serde::{Deserialize, Deserializer, de},
    serde_with::DeserializeAs,
};

/// Deserialize an [`eth::ChainId`] from either a number (`137`) or a decimal
/// or hex string (`"137"`, `"0x89"`).
#[derive(Debug)]
pub struct ChainId;

impl<'de> DeserializeAs<'de, eth::ChainId> for ChainId {
    fn deserialize_as<D: Deserializer<'de>>(deserializer: D) -> Result<eth::ChainId, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u64),
            String(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(eth::ChainId(value)),
            Repr::String(value) => value.parse().map_err(de::Error::custom),
        }
    }
}
