//! Stream profiles and the registry the host discovers them through.

use std::{collections::BTreeMap, fmt};

use log::debug;

use crate::{
    stream::{Stream, StreamOptions},
    template,
};

pub mod end_dx4;

/// A generator of streams for the host's transmission engine.
pub trait StreamProfile: Send + Sync {
    fn name(&self) -> &'static str;
    fn get_streams(&self, opts: &StreamOptions) -> Result<Vec<Stream>, Error>;
}

/// Zero-argument constructor of a profile
pub type ProfileCtor = fn() -> Box<dyn StreamProfile>;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    Template(template::Error),
    UnknownProfile { name: String },
    DuplicateProfile { name: &'static str },
}

impl From<template::Error> for Error {
    fn from(e: template::Error) -> Self {
        Error::Template(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Template(e) => write!(f, "failed to build packet template: {:?}", e),
            Error::UnknownProfile { name } => write!(f, "unknown profile `{}`", name),
            Error::DuplicateProfile { name } => write!(f, "profile `{}` already registered", name),
        }
    }
}

impl std::error::Error for Error {}

#[derive(Default)]
pub struct ProfileRegistry {
    ctors: BTreeMap<&'static str, ProfileCtor>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every profile shipped with this crate.
    pub fn builtin() -> Self {
        let mut this = Self::new();
        this.ctors.insert(end_dx4::NAME, end_dx4::register);
        this
    }

    pub fn register(&mut self, name: &'static str, ctor: ProfileCtor) -> Result<(), Error> {
        if self.ctors.contains_key(name) {
            return Err(Error::DuplicateProfile { name });
        }
        self.ctors.insert(name, ctor);
        debug!("registered profile `{}`", name);
        Ok(())
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn StreamProfile>, Error> {
        let ctor = self.ctors.get(name).ok_or_else(|| Error::UnknownProfile {
            name: name.to_string(),
        })?;
        Ok(ctor())
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.ctors.keys().copied()
    }
}
