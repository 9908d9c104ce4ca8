use serde::{Deserialize, Serialize};

use crate::db_types::Satoshis;

//--------------------------------------   NativeTransaction   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NativeInput {
    /// The address that funded this input, if the script has one.
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeOutput {
    #[serde(default)]
    pub address: Option<String>,
    pub amount: Satoshis,
}

/// A decoded native-chain transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NativeTransaction {
    pub txid: String,
    #[serde(default)]
    pub inputs: Vec<NativeInput>,
    #[serde(default)]
    pub outputs: Vec<NativeOutput>,
}

impl NativeTransaction {
    /// Input addresses, de-duplicated, in input order.
    pub fn sources(&self) -> Vec<String> {
        let mut result: Vec<String> = Vec::with_capacity(self.inputs.len());
        for addr in self.inputs.iter().filter_map(|i| i.address.as_ref()) {
            if !result.contains(addr) {
                result.push(addr.clone());
            }
        }
        result
    }

    /// Outputs that pay an address, paired with that address.
    pub fn addressed_outputs(&self) -> impl Iterator<Item = (&str, Satoshis)> {
        self.outputs.iter().filter_map(|o| o.address.as_deref().map(|a| (a, o.amount)))
    }
}

//--------------------------------------       TokenSend       ---------------------------------------------------------
/// A token-layer asset transfer.
///
/// `quantity` is in the asset's own unit: smallest units for divisible assets, whole units otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSend {
    pub tx_hash: String,
    /// The token layer's own transaction index. Absent for mempool sends.
    #[serde(default)]
    pub tx_index: Option<i64>,
    #[serde(default)]
    pub block_index: Option<i64>,
    pub source: String,
    pub destination: String,
    pub asset: String,
    pub quantity: i64,
    pub divisible: bool,
}

impl TokenSend {
    /// The quantity in smallest units, comparable with native amounts.
    pub fn normalized_quantity(&self) -> Result<Satoshis, paywatch_common::SatoshiConversionError> {
        if self.divisible {
            Ok(Satoshis::from(self.quantity))
        } else {
            Satoshis::from_whole_units(self.quantity)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn native_sources_are_deduplicated() {
        let tx = NativeTransaction {
            txid: "aa".into(),
            inputs: vec![
                NativeInput { address: Some("src1".into()) },
                NativeInput { address: None },
                NativeInput { address: Some("src2".into()) },
                NativeInput { address: Some("src1".into()) },
            ],
            outputs: vec![
                NativeOutput { address: Some("dest01".into()), amount: 5_000.into() },
                NativeOutput { address: None, amount: 0.into() },
            ],
        };
        assert_eq!(tx.sources(), vec!["src1".to_string(), "src2".to_string()]);
        assert_eq!(tx.addressed_outputs().collect::<Vec<_>>(), vec![("dest01", Satoshis::from(5_000))]);
    }

    #[test]
    fn token_send_from_json() {
        let json = r#"{
            "tx_hash": "abcd",
            "tx_index": 100000,
            "block_index": 300000,
            "source": "1AEw",
            "destination": "dest01",
            "asset": "TOKENLY",
            "quantity": 5,
            "divisible": false
        }"#;
        let send: TokenSend = serde_json::from_str(json).unwrap();
        assert_eq!(send.tx_index, Some(100000));
        assert_eq!(send.normalized_quantity().unwrap().value(), 500_000_000);

        let mempool = r#"{"tx_hash":"ef","source":"a","destination":"b","asset":"XCP","quantity":490000000,"divisible":true}"#;
        let send: TokenSend = serde_json::from_str(mempool).unwrap();
        assert_eq!(send.tx_index, None);
        assert_eq!(send.normalized_quantity().unwrap().value(), 490_000_000);
    }
}
