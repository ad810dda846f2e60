//! ABI bindings for the token and distributor contracts.

use alloy::sol;

sol! {
    /// Subset of the ERC-20 interface used by the batch flow.
    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function symbol() external view returns (string memory);
        function decimals() external view returns (uint8);
    }
}

sol! {
    /// Batch distributor. Pulls `_amounts[i]` of `_tokenAddress` from the caller
    /// and sends it to `_recipients[i]`.
    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface IBatchDistributor {
        function batchTransferToken(address _tokenAddress, address[] _recipients, uint256[] _amounts) external;
    }
}
