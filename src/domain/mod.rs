pub mod contract;
pub mod dapp;
pub mod eth;
pub mod operation;
pub mod wallet;
