use keyed::prelude::*;
use std::sync::Arc;

/// Shared address book used as the capability set of the contact factories.
#[derive(Debug, Default)]
pub struct Directory {
    pub domain: String,
}

impl Directory {
    #[must_use]
    pub fn email(&self, user: &str) -> String {
        format!("{user}@{}", self.domain)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Contact {
    pub name: Option<String>,
    pub configured: u32,
}

/// A capability written against [`Keyed`] and reusable across keyed types.
pub trait Addressable: Keyed {
    fn address(&self) -> String;
}

impl<S> Addressable for Entity<S, Directory> {
    fn address(&self) -> String {
        self.base().email(self.key())
    }
}

pub type Contacts = KeyedFactory<Contact, Option<String>, Directory>;

/// Builds a contact factory whose routine records the name and counts invocations.
#[must_use]
pub fn contacts(directory: &Arc<Directory>) -> Contacts {
    contacts_with(directory, AssignPolicy::Trust)
}

#[must_use]
pub fn contacts_with(directory: &Arc<Directory>, policy: AssignPolicy) -> Contacts {
    KeyedFactory::builder()
        .name("contacts")
        .assign_policy(policy)
        .base(Arc::clone(directory))
        .configure(|contact: &mut Contact, name: Option<String>| {
            contact.name = name;
            contact.configured += 1;
        })
        .build()
}

#[must_use]
pub fn directory() -> Arc<Directory> {
    Arc::new(Directory { domain: "example.org".to_owned() })
}
