use alloy_primitives::{Address, Bytes};

/// The execution environment a proxy performs its calls through.
///
/// Implemented by the in-memory [`Vm`](crate::vm::Vm); a chain client or simulator can
/// implement it as well. `Err` carries the callee's raw revert payload.
pub trait CallHost {
    /// Run `code`'s logic against `context`'s storage and balance.
    ///
    /// The callee observes `context` as the executing account and `sender` as its caller.
    fn delegate_call(
        &mut self,
        context: Address,
        sender: Address,
        code: Address,
        data: &[u8],
    ) -> Result<Bytes, Bytes>;

    /// Ordinary external call from `caller` into `target`.
    fn call(&mut self, caller: Address, target: Address, data: &[u8]) -> Result<Bytes, Bytes>;
}
