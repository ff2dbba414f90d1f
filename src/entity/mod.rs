pub mod device_data;
pub mod device_group_devices;
pub mod device_groups;
pub mod device_logs;
pub mod devices;
pub mod users;
