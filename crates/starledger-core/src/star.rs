//! Star claims: the payload the notary records.
//!
//! A claim's story is stored hex-encoded so arbitrary text survives the
//! round trip through storage unchanged. Lookups can render a
//! [`StarBlockView`] that carries the decoded story alongside.

use serde::{Deserialize, Serialize};

use crate::block::{Block, Payload};
use crate::types::Address;

/// Address the genesis claim is registered under.
const GENESIS_ADDRESS: &str = "13Ps1qPQALKwXKYNPDi2enycoYEN2hZbGu";

/// A star as recorded on the ledger.
///
/// Declaration order is serialization order and feeds the block digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Star {
    /// Right ascension.
    pub ra: String,
    /// Declination.
    pub dec: String,
    /// Magnitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mag: Option<String>,
    /// Constellation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cen: Option<String>,
    /// Hex-encoded story text.
    pub story: String,
}

impl Star {
    /// Create a star, hex-encoding the plain-text `story`.
    pub fn new(ra: impl Into<String>, dec: impl Into<String>, story: &str) -> Self {
        Self {
            ra: ra.into(),
            dec: dec.into(),
            mag: None,
            cen: None,
            story: hex::encode(story),
        }
    }

    pub fn with_mag(mut self, mag: impl Into<String>) -> Self {
        self.mag = Some(mag.into());
        self
    }

    pub fn with_cen(mut self, cen: impl Into<String>) -> Self {
        self.cen = Some(cen.into());
        self
    }

    /// Decode the story back to text.
    ///
    /// Bytes that are not valid UTF-8 are replaced; a story that is not
    /// valid hex decodes to an empty string.
    pub fn decoded_story(&self) -> String {
        match hex::decode(&self.story) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => String::new(),
        }
    }
}

/// A claim on a star, submitted under an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarClaim {
    pub address: String,
    pub star: Star,
}

impl StarClaim {
    pub fn new(address: impl AsRef<str>, star: Star) -> Self {
        Self {
            address: address.as_ref().to_owned(),
            star,
        }
    }

    /// The claim's address as a typed [`Address`].
    pub fn owner(&self) -> Address {
        Address::new(self.address.clone())
    }
}

impl Payload for StarClaim {
    fn address(&self) -> &str {
        &self.address
    }

    /// Fields keep the [`Star`] order, so this genesis does not hash
    /// like one written with `dec` ahead of `ra`.
    fn genesis() -> Self {
        Self::new(
            GENESIS_ADDRESS,
            Star::new("12h 50m 26.0s", "25° 29' 23.9", "Genesis Star"),
        )
    }
}

/// A star with its story decoded, for lookup responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedStar {
    #[serde(flatten)]
    pub star: Star,
    pub story_decoded: String,
}

/// A star claim with its story decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StarClaimView {
    pub address: String,
    pub star: DecodedStar,
}

/// A block of star claims as shown to lookup callers.
///
/// This is a presentation type; it is never hashed or stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StarBlockView {
    pub hash: String,
    pub height: u64,
    pub body: StarClaimView,
    pub time: String,
    pub previous_block_hash: String,
}

impl From<Block<StarClaim>> for StarBlockView {
    fn from(block: Block<StarClaim>) -> Self {
        let story_decoded = block.body.star.decoded_story();
        Self {
            hash: block.hash,
            height: block.height,
            body: StarClaimView {
                address: block.body.address,
                star: DecodedStar {
                    star: block.body.star,
                    story_decoded,
                },
            },
            time: block.time,
            previous_block_hash: block.previous_block_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_is_hex_encoded() {
        let star = Star::new("16h 29m 1.0s", "68° 52' 56.9", "Found star using https://www.google.com/sky/");
        assert_eq!(
            star.story,
            "466f756e642073746172207573696e672068747470733a2f2f7777772e676f6f676c652e636f6d2f736b792f"
        );
        assert_eq!(star.decoded_story(), "Found star using https://www.google.com/sky/");
    }

    #[test]
    fn test_optional_fields_omitted_when_absent() {
        let star = Star::new("1h", "2°", "s");
        let json = serde_json::to_string(&star).unwrap();
        assert!(!json.contains("mag"));
        assert!(!json.contains("cen"));

        let star = star.with_mag("4.2").with_cen("Ursa Minor");
        let json = serde_json::to_string(&star).unwrap();
        assert!(json.contains(r#""mag":"4.2","cen":"Ursa Minor","story""#));
    }

    #[test]
    fn test_invalid_hex_story_decodes_empty() {
        let mut star = Star::new("1h", "2°", "s");
        star.story = "not hex".into();
        assert_eq!(star.decoded_story(), "");
    }

    #[test]
    fn test_genesis_claim() {
        let genesis = StarClaim::genesis();
        assert_eq!(genesis.address(), GENESIS_ADDRESS);
        assert_eq!(genesis.star.decoded_story(), "Genesis Star");
    }

    #[test]
    fn test_block_view_adds_decoded_story_after_story() {
        let block = Block::<StarClaim>::genesis(1).unwrap();
        let view = StarBlockView::from(block.clone());
        assert_eq!(view.hash, block.hash);
        assert_eq!(view.body.star.story_decoded, "Genesis Star");

        let json = serde_json::to_string(&view).unwrap();
        let story_at = json.find("\"story\"").unwrap();
        let decoded_at = json.find("\"storyDecoded\"").unwrap();
        assert!(story_at < decoded_at);
        assert!(json.contains("\"previousBlockHash\":\"\""));
    }
}
