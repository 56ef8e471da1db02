//! # Roster
//!
//! The member collection. Mirrors `Catalog`: a shared `Roster` view for
//! lookups and searches, `RosterMut` for adds and for `LendingService`.

use log::{debug, info};

use super::error::{EntityKind, LibraryError};
use super::ids::{IdPrefix, IdentifierGenerator};
use super::model::{Member, required_text, text_matches};

#[derive(Clone, Copy)]
pub struct Roster<'a> {
    members: &'a [Member],
}

impl<'a> Roster<'a> {
    pub fn new(members: &'a [Member]) -> Self {
        Self { members }
    }

    pub fn find(&self, id: &str) -> Option<&'a Member> {
        let found = self.members.iter().find(|m| m.id == id);
        if found.is_none() {
            debug!("Member lookup missed: {}", id);
        }
        found
    }

    /// All members, or those whose name or email contains `filter` (any case).
    pub fn list(&self, filter: Option<&str>) -> Vec<&'a Member> {
        match filter {
            Some(query) => self
                .members
                .iter()
                .filter(|m| text_matches(query, &[m.name.as_str(), m.email.as_str()]))
                .collect(),
            None => self.members.iter().collect(),
        }
    }
}

pub struct RosterMut<'a> {
    members: &'a mut Vec<Member>,
}

impl<'a> RosterMut<'a> {
    pub fn new(members: &'a mut Vec<Member>) -> Self {
        Self { members }
    }

    /// Appends a member with no loans.
    pub fn add(
        &mut self,
        ids: &mut IdentifierGenerator,
        name: &str,
        email: &str,
    ) -> Result<Member, LibraryError> {
        let name = required_text("name", name)?;
        let email = required_text("email", email)?;

        let id = ids.generate_unique(IdPrefix::Member, |candidate| {
            self.members.iter().any(|m| m.id == candidate)
        })?;

        let member = Member {
            id,
            name,
            email,
            borrowed: Vec::new(),
        };
        info!("Added member {} '{}'", member.id, member.name);
        self.members.push(member.clone());
        Ok(member)
    }

    /// A miss is a `NotFound` error.
    pub fn get_mut(&mut self, id: &str) -> Result<&mut Member, LibraryError> {
        self.members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| LibraryError::not_found(EntityKind::Member, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::is_well_formed;

    #[test]
    fn test_add_creates_member_without_loans() {
        let mut members = Vec::new();
        let mut ids = IdentifierGenerator::seeded(11);
        let alice = RosterMut::new(&mut members)
            .add(&mut ids, " Alice ", "a@x.com ")
            .unwrap();
        assert_eq!(alice.name, "Alice");
        assert_eq!(alice.email, "a@x.com");
        assert!(alice.borrowed.is_empty());
        assert!(is_well_formed(&alice.id, IdPrefix::Member));
        assert_eq!(members, vec![alice]);
    }

    #[test]
    fn test_add_rejects_empty_name_or_email() {
        let mut members = Vec::new();
        let mut ids = IdentifierGenerator::seeded(11);
        let mut roster = RosterMut::new(&mut members);
        assert!(matches!(
            roster.add(&mut ids, "", "a@x.com"),
            Err(LibraryError::Validation(_))
        ));
        assert!(matches!(
            roster.add(&mut ids, "Alice", "  "),
            Err(LibraryError::Validation(_))
        ));
        assert!(members.is_empty());
    }

    #[test]
    fn test_get_mut_reports_member_kind() {
        let mut members = vec![crate::test_support::member("M_ALICE")];
        let mut roster = RosterMut::new(&mut members);
        roster.get_mut("M_ALICE").unwrap().name = "Alice".to_string();
        let err = roster.get_mut("M_ZZZZZ").unwrap_err();
        assert!(matches!(
            err,
            LibraryError::NotFound { kind: EntityKind::Member, ref id } if id == "M_ZZZZZ"
        ));
    }

    #[test]
    fn test_list_filters_name_and_email() {
        let mut members = Vec::new();
        let mut ids = IdentifierGenerator::seeded(2);
        let mut roster = RosterMut::new(&mut members);
        roster.add(&mut ids, "Alice Liddell", "alice@wonder.land").unwrap();
        roster.add(&mut ids, "Bob", "bob@example.com").unwrap();
        roster.add(&mut ids, "Carol", "carol@wonder.land").unwrap();

        let roster = Roster::new(&members);
        assert_eq!(roster.list(None).len(), 3);
        assert_eq!(roster.list(Some("WONDER")).len(), 2);
        assert_eq!(roster.list(Some("bob")).len(), 1);
        assert!(roster.list(Some("dave")).is_empty());
        let bob_id = roster.list(Some("bob"))[0].id.clone();
        assert_eq!(roster.find(&bob_id).map(|m| m.name.as_str()), Some("Bob"));
    }
}
