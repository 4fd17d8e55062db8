//! Cliente REST del servicio de aprovisionamiento.
//!
//! Implementa `provisioning_api::ProvisioningApi` sobre HTTP con un cliente
//! bloqueante: cada operación de las guías hace una única petición y espera la
//! respuesta dentro del mismo ciclo de petición del usuario.

mod config;
mod rest;
mod wire;

pub use config::{ClientConfig, ClientConfigError};
pub use rest::RestProvisioningClient;
