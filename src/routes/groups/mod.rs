mod handlers;
mod types;

pub use handlers::{create_group, delete_group, get_group, list_groups, update_group};
pub use types::{normalize_member_ids, CreateGroupRequest, GroupResponse, UpdateGroupRequest};

// Re-export utoipa path structs for OpenAPI documentation
pub use handlers::{
    __path_create_group, __path_delete_group, __path_get_group, __path_list_groups,
    __path_update_group,
};
