//env
pub const DAO_CHAIN_RPC_URL_NOT_SET: &str = "DAO_CHAIN_RPC_URL not set!";
pub const DAO_CONTRACT_ADDRESS_NOT_SET: &str = "DAO_CONTRACT_ADDRESS not set!";
pub const CREATE_PROPOSAL_PRIVATE_KEY_NOT_SET: &str = "CREATE_PROPOSAL_PRIVATE_KEY not set!";

//chain
pub const MEMBERSHIP_CHECK_FAILED: &str = "Failed to check DAO membership";
pub const JOIN_DAO_FAILED: &str = "Failed to join DAO";
pub const CREATE_PROPOSAL_FAILED: &str = "Failed to create proposal";

//ipfs
pub const IPFS_FETCH_FAILED: &str = "Failed to fetch from IPFS";
