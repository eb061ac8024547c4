use uuid::Uuid;

pub fn generate() -> String {
    Uuid::new_v4().to_string()
}

pub fn is_valid(device_id: &str) -> bool {
    Uuid::parse_str(device_id).is_ok_and(|uuid| !uuid.is_nil())
}
