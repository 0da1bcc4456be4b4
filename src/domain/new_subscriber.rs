use serde::Serialize;

use super::SubscriberEmail;

/// The single record this service ever writes. Serializes as `{"email": ...}`,
/// which is exactly the row shape of the remote `subscribers` table.
#[derive(Debug, Clone, Serialize)]
pub struct NewSubscriber {
    pub email: SubscriberEmail,
}

impl TryFrom<String> for NewSubscriber {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        let email = SubscriberEmail::parse(value)?;
        Ok(Self { email })
    }
}
