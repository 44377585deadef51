//! Calls against a fixed on-chain contract, encoded and decoded from the
//! contract's JSON interface description.

use {
    crate::domain::eth,
    alloy::{
        dyn_abi::{DynSolType, DynSolValue, FunctionExt, JsonAbiExt, Specifier},
        json_abi::{Function, JsonAbi},
    },
    std::{fmt, sync::Arc},
};

/// A deployed contract and the interface it is called through.
#[derive(Clone, Debug)]
pub struct ContractTarget {
    pub address: eth::ContractAddress,
    pub interface: Arc<JsonAbi>,
}

impl ContractTarget {
    pub fn new(address: eth::ContractAddress, interface: JsonAbi) -> Self {
        Self {
            address,
            interface: Arc::new(interface),
        }
    }

    /// Looks up a method by name. Overloaded methods resolve to their first
    /// declaration.
    pub fn function(&self, method: &str) -> Result<&Function, Error> {
        self.interface
            .function(method)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| Error::UnknownMethod(method.to_owned()))
    }

    /// Encodes a call from textual arguments, coercing each of them to the
    /// type the method declares for it. `string` arguments are taken verbatim;
    /// everything else is trimmed before parsing.
    pub fn encode(&self, method: &str, args: &[&str]) -> Result<Call, Error> {
        let function = self.function(method)?;
        if function.inputs.len() != args.len() {
            return Err(Error::Arity {
                method: method.to_owned(),
                expected: function.inputs.len(),
                got: args.len(),
            });
        }

        let values = function
            .inputs
            .iter()
            .zip(args)
            .map(|(param, arg)| {
                let ty = param.resolve()?;
                if ty == DynSolType::String {
                    return Ok(DynSolValue::String((*arg).to_owned()));
                }
                ty.coerce_str(arg.trim()).map_err(|err| Error::InvalidArgument {
                    method: method.to_owned(),
                    ty: ty.sol_type_name().into_owned(),
                    reason: err.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let calldata = function.abi_encode_input(&values)?;

        Ok(Call {
            function: function.clone(),
            calldata,
        })
    }

    /// Returns `true` if the method takes exactly one `address` argument, i.e.
    /// is a getter keyed by the account it is read for.
    pub fn takes_owner(&self, method: &str) -> Result<bool, Error> {
        let function = self.function(method)?;
        Ok(matches!(function.inputs.as_slice(), [param] if param.ty == "address"))
    }

    pub fn is_view(&self, method: &str) -> Result<bool, Error> {
        use alloy::json_abi::StateMutability;

        let function = self.function(method)?;
        Ok(matches!(
            function.state_mutability,
            StateMutability::View | StateMutability::Pure
        ))
    }
}

/// An encoded method call.
#[derive(Clone, Debug)]
pub struct Call {
    function: Function,
    calldata: Vec<u8>,
}

impl Call {
    pub fn method(&self) -> &str {
        &self.function.name
    }

    pub fn calldata(&self) -> &[u8] {
        &self.calldata
    }

    /// Decodes the single value returned by a getter.
    pub fn decode(&self, output: &[u8]) -> Result<Value, Error> {
        let mut values = self.function.abi_decode_output(output)?;
        if values.is_empty() {
            return Err(Error::EmptyOutput(self.function.name.clone()));
        }
        Ok(Value(values.swap_remove(0)))
    }
}

/// A value read from a contract, displayed the way a user would type it back
/// in.
#[derive(Clone, Debug, PartialEq)]
pub struct Value(pub DynSolValue);

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display(&self.0, f)
    }
}

fn display(value: &DynSolValue, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        DynSolValue::String(s) => f.write_str(s),
        DynSolValue::Uint(n, _) => write!(f, "{n}"),
        DynSolValue::Int(n, _) => write!(f, "{n}"),
        DynSolValue::Bool(b) => write!(f, "{b}"),
        DynSolValue::Address(address) => write!(f, "{address}"),
        DynSolValue::Bytes(bytes) => write!(f, "0x{}", alloy::primitives::hex::encode(bytes)),
        DynSolValue::FixedBytes(word, size) => {
            write!(f, "0x{}", alloy::primitives::hex::encode(&word[..*size]))
        }
        DynSolValue::Array(values)
        | DynSolValue::FixedArray(values)
        | DynSolValue::Tuple(values) => {
            f.write_str("[")?;
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                display(value, f)?;
            }
            f.write_str("]")
        }
        other => write!(f, "{other:?}"),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("contract has no method {0:?}")]
    UnknownMethod(String),
    #[error("{method} takes {expected} argument(s), got {got}")]
    Arity {
        method: String,
        expected: usize,
        got: usize,
    },
    #[error("invalid {ty} argument for {method}: {reason}")]
    InvalidArgument {
        method: String,
        ty: String,
        reason: String,
    },
    #[error("{0} returned no value")]
    EmptyOutput(String),
    #[error(transparent)]
    Abi(#[from] alloy::dyn_abi::Error),
}
