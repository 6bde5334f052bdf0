use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid repo descriptor. Expected \"owner/repo\".")]
pub struct ParseFailure;

/// A GitHub repository named as `owner/name`.
///
/// Both halves are non-empty and free of `/`; the only ways to build one are
/// [`parse`] and [`RepoDescriptor::new`], which enforce that.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoDescriptor {
    owner: String,
    name: String,
}

impl RepoDescriptor {
    pub fn new(owner: &str, name: &str) -> Result<Self, ParseFailure> {
        if !is_segment(owner) || !is_segment(name) {
            return Err(ParseFailure);
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepoDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

fn is_segment(s: &str) -> bool {
    !s.is_empty() && !s.contains('/')
}

pub fn parse(text: &str) -> Result<RepoDescriptor, ParseFailure> {
    let parts: Vec<&str> = text.split('/').collect();
    match parts.as_slice() {
        [owner, name] => RepoDescriptor::new(owner, name),
        _ => Err(ParseFailure),
    }
}
