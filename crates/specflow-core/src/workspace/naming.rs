//! Deterministic identifiers for specs and their isolated resources.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{OrchestratorError, Result};

/// Maximum length of a spec name.
pub const MAX_NAME_LEN: usize = 64;

/// Generates a fresh 8-character lowercase hex spec id.
pub fn new_spec_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// Whether `id` has the shape of a spec id.
pub fn is_spec_id(id: &str) -> bool {
    id.len() == 8 && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Checks that `name` is a kebab-case slug.
pub fn validate_spec_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("name cannot be empty".to_string())
    } else if name.len() > MAX_NAME_LEN {
        Some(format!("name is longer than {MAX_NAME_LEN} characters"))
    } else if !name
        .bytes()
        .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'-'))
    {
        Some("name must contain only lowercase letters, digits and '-'".to_string())
    } else if name.starts_with('-') || name.ends_with('-') {
        Some("name cannot start or end with '-'".to_string())
    } else {
        None
    };

    match reason {
        Some(reason) => Err(OrchestratorError::invalid_input("name").with_reason(reason)),
        None => Ok(()),
    }
}

/// `<prefix>/<id>-<name>`
pub fn branch_name(prefix: &str, id: &str, name: &str) -> String {
    format!("{prefix}/{id}-{name}")
}

/// `<root>/<worktree_dir>/spec-<id>-<name>`
pub fn workspace_path(root: &Path, worktree_dir: &Path, id: &str, name: &str) -> PathBuf {
    root.join(worktree_dir).join(format!("spec-{id}-{name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_short_hex() {
        let a = new_spec_id();
        let b = new_spec_id();
        assert!(is_spec_id(&a), "{a}");
        assert!(is_spec_id(&b), "{b}");
        assert_ne!(a, b);
    }

    #[test]
    fn test_name_validation() {
        assert!(validate_spec_name("login-flow").is_ok());
        assert!(validate_spec_name("v2").is_ok());
        assert!(validate_spec_name("").is_err());
        assert!(validate_spec_name("Login").is_err());
        assert!(validate_spec_name("a_b").is_err());
        assert!(validate_spec_name("-a").is_err());
        assert!(validate_spec_name("a-").is_err());
        assert!(validate_spec_name(&"a".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_resource_names() {
        assert_eq!(branch_name("spec", "0a1b2c3d", "login"), "spec/0a1b2c3d-login");
        assert_eq!(
            workspace_path(Path::new("/repo"), Path::new("worktrees"), "0a1b2c3d", "login"),
            PathBuf::from("/repo/worktrees/spec-0a1b2c3d-login")
        );
    }
}
