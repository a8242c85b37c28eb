use std::fmt;
use std::str::FromStr;

use codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Encode, Decode, TypeInfo, Clone, PartialEq, Eq, Debug, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    #[default]
    Bitcoin,
    Testnet,
    Regtest,
    Signet,
    Litecoin,
    LitecoinTestnet,
}

impl Network {
    pub const ALL: [Network; 6] = [
        Network::Bitcoin,
        Network::Testnet,
        Network::Regtest,
        Network::Signet,
        Network::Litecoin,
        Network::LitecoinTestnet,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Network::Bitcoin => "bitcoin",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
            Network::Signet => "signet",
            Network::Litecoin => "litecoin",
            Network::LitecoinTestnet => "litecoin_testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Network::ALL
            .iter()
            .copied()
            .find(|network| network.name() == name)
            .ok_or(Error::UnknownNetwork)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_names() {
        for network in Network::ALL {
            assert_eq!(network.name().parse::<Network>(), Ok(network));
            assert_eq!(network.to_string(), network.name());
        }
        assert_eq!("dogecoin".parse::<Network>(), Err(Error::UnknownNetwork));
        assert_eq!(Network::default(), Network::Bitcoin);
    }

    #[test]
    fn test_network_serde() {
        assert_eq!(
            serde_json::to_string(&Network::LitecoinTestnet).unwrap(),
            "\"litecoin_testnet\""
        );
        assert_eq!(
            serde_json::from_str::<Network>("\"regtest\"").unwrap(),
            Network::Regtest
        );
    }
}
