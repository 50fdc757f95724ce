/// Build a template logical id from construct names.
///
/// Every run of non-alphanumeric characters starts a new word and each word
/// is capitalised, so `["vpc-springgroot", "PublicSubnet1"]` becomes
/// `VpcSpringgrootPublicSubnet1`.
pub fn logical_id(parts: &[&str]) -> String {
    let mut id = String::new();
    for part in parts {
        for word in part.split(|c: char| !c.is_ascii_alphanumeric()) {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                id.push(first.to_ascii_uppercase());
                id.extend(chars);
            }
        }
    }
    id
}
