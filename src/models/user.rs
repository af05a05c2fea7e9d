use jiff::Timestamp;

/// Type name used when generating user uuids, e.g. `USER-PROFILE-...`.
pub const USER_ENTITY: &str = "UserProfile";

/// An account. Users carry no audit envelope and are removed physically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub uuid: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Argon2 PHC string, never the plaintext.
    pub password: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub date_joined: Timestamp,
}

impl User {
    /// First and last name joined by a space, trimmed when either is empty.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Data for inserting a new user; `password` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub uuid: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub date_joined: Timestamp,
}

/// Profile fields an admin may change. `None` leaves the field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl UserChanges {
    pub fn apply_to(self, user: &mut User) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str) -> User {
        User {
            id: 1,
            uuid: "USER-PROFILE-x".to_string(),
            username: "jdoe".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: "jdoe@example.com".to_string(),
            password: "hash".to_string(),
            is_admin: false,
            is_active: true,
            date_joined: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(user("Jane", "Doe").full_name(), "Jane Doe");
        assert_eq!(user("Jane", "").full_name(), "Jane");
        assert_eq!(user("", "").full_name(), "");
    }

    #[test]
    fn test_changes_only_touch_given_fields() {
        let mut u = user("Jane", "Doe");
        UserChanges {
            email: Some("new@example.com".to_string()),
            ..Default::default()
        }
        .apply_to(&mut u);
        assert_eq!(u.email, "new@example.com");
        assert_eq!(u.first_name, "Jane");
    }
}
