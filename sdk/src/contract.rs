use alloy::sol;

sol! {
    contract Whitelist {
        // ========= Events =========
        event WhitelistAccount(address accountId);

        // ========= User flows =========
        function whitelist(address accountId) external;

        // ========= Views =========
        function message() external view returns (string memory);
    }
}

/// Human readable ABI signatures used to build call specs for the contract.
pub const WHITELIST_SIGNATURE: &str = "function whitelist(address accountId)";
pub const MESSAGE_SIGNATURE: &str = "function message() view returns (string)";
