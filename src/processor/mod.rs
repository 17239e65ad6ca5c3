//! Semantic pass over a parsed unit.
//!
//! Binds every RPC's argument and return type name to the message that
//! defines it. Runs when code for a service is about to be generated, so a
//! unit that parses cleanly can still fail here.

use thiserror::Error;

use crate::model::{CompilationUnit, Message, RpcMethod, Service};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("undefined message type `{name}` referenced by rpc `{service}::{method}`")]
    UndefinedMessageType {
        name: String,
        method: String,
        service: String,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct ResolvedMethod<'u> {
    pub method: &'u RpcMethod,
    pub arg: &'u Message,
    pub ret: &'u Message,
}

/// A service whose every method is bound to messages of the same unit.
#[derive(Debug, Clone)]
pub struct ResolvedService<'u> {
    pub service: &'u Service,
    pub methods: Vec<ResolvedMethod<'u>>,
}

impl<'u> ResolvedService<'u> {
    pub fn name(&self) -> &'u str {
        &self.service.name
    }
}

pub fn resolve_service<'u>(
    unit: &'u CompilationUnit,
    service: &'u Service,
) -> Result<ResolvedService<'u>, ResolveError> {
    let methods = service
        .methods
        .iter()
        .map(|method| {
            let arg = lookup(unit, service, method, &method.arg)?;
            let ret = lookup(unit, service, method, &method.ret)?;
            Ok(ResolvedMethod { method, arg, ret })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ResolvedService { service, methods })
}

fn lookup<'u>(
    unit: &'u CompilationUnit,
    service: &Service,
    method: &RpcMethod,
    name: &str,
) -> Result<&'u Message, ResolveError> {
    unit.message(name)
        .ok_or_else(|| ResolveError::UndefinedMessageType {
            name: name.to_string(),
            method: method.name.clone(),
            service: service.name.clone(),
        })
}

/// Resolve every service of the unit in declaration order; first failure wins.
pub fn resolve_all(unit: &CompilationUnit) -> Result<Vec<ResolvedService<'_>>, ResolveError> {
    unit.services
        .iter()
        .map(|service| resolve_service(unit, service))
        .collect()
}
