use {
    crate::domain::{contract::ContractTarget, eth},
    alloy::{
        json_abi::JsonAbi,
        primitives::{Address, address},
    },
};

/// The contracts behind the bundled apps, with their public deployments.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Contract {
    HelloWorld,
    SimpleStorage,
    MultiStorage,
}

impl Contract {
    /// The address the contract is deployed at.
    pub fn deployment(self) -> eth::ContractAddress {
        eth::ContractAddress(match self {
            Contract::HelloWorld => address!("0x82a2ce96da8f45b6c59bec5059f6a3f4516ef653"),
            Contract::SimpleStorage => address!("0xf41f53fcadd447d0ea0464637d1a0dfed3b75542"),
            Contract::MultiStorage => address!("0x8b85679f592cd1d2af0c022f4ce7ce850ff569f0"),
        })
    }

    pub fn interface(self) -> JsonAbi {
        let json = match self {
            Contract::HelloWorld => include_str!("../../abi/HelloWorld.json"),
            Contract::SimpleStorage => include_str!("../../abi/SimpleStorage.json"),
            Contract::MultiStorage => include_str!("../../abi/MultiStorage.json"),
        };
        serde_json::from_str(json).expect("bundled contract interfaces are valid")
    }

    pub fn target(self, address: Option<eth::ContractAddress>) -> ContractTarget {
        ContractTarget::new(address.unwrap_or(self.deployment()), self.interface())
    }
}

/// An account with sample data in the multi-storage contract.
pub const MULTI_STORAGE_EXAMPLE_OWNER: Address =
    address!("0x5b38da6a701c568545dcfcb03fcb875f56beddc4");
