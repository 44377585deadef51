pub mod dapp;
