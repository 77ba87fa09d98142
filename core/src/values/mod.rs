pub mod construct;
pub mod function;
pub mod signature;

pub use construct::{
    Construct, ConstructKind, ConstructRef, MAX_PROTOTYPE_DEPTH, Value, ValueError,
};
pub use function::{Completion, Continuation, Function, NativeFn, Script};
pub use signature::{InvalidParameter, Parameter, ParameterKind, Signature};

#[cfg(test)]
mod construct_test;
