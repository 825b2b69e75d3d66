//! Message registry
//!
//! Maps every service id (0x00-0xFF) to the shape used to decode it. The
//! standard table is built once per process and shared read-only.

mod names;
mod services;
mod shape;
mod standard;

use std::sync::OnceLock;

use tracing::debug;

use crate::constants::service_id::{NEGATIVE_RESPONSE, RESPONSE_BIT};
use crate::error::RegistryError;

pub use names::NameTables;
pub use services::ServiceKind;
pub use shape::{Direction, MessageShape, ShapeBuilder};

/// Service id → message shape lookup table
#[derive(Debug, Clone)]
pub struct Registry {
    slots: Vec<Option<MessageShape>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            slots: vec![None; 256],
        }
    }

    /// Registry with every standard ISO 14229-1 service
    pub fn with_standard_services() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        standard::populate(&mut registry)?;
        debug!(shapes = registry.len(), "Built standard UDS registry");
        Ok(registry)
    }

    /// Process-wide standard registry
    ///
    /// The standard table is covered by tests, so a construction failure
    /// here means a broken build; it falls back to an empty registry, which
    /// makes every decode report `UnknownService`.
    pub fn standard() -> &'static Registry {
        static STANDARD: OnceLock<Registry> = OnceLock::new();
        STANDARD.get_or_init(|| {
            Self::with_standard_services().unwrap_or_else(|e| {
                tracing::error!(error = %e, "Standard UDS registry is invalid");
                Self::new()
            })
        })
    }

    /// Associate a request shape with its positive response shape
    pub fn register(
        &mut self,
        request: MessageShape,
        response: MessageShape,
    ) -> Result<(), RegistryError> {
        let request_id = request.service_id();
        let response_id = response.service_id();

        if request_id & RESPONSE_BIT != 0 || request_id == NEGATIVE_RESPONSE {
            return Err(RegistryError::ServiceConflict {
                service_id: request_id,
                reason: "request id has the response bit set".to_string(),
            });
        }
        if response_id != request_id | RESPONSE_BIT {
            return Err(RegistryError::ServiceConflict {
                service_id: response_id,
                reason: format!("expected response id 0x{:02X}", request_id | RESPONSE_BIT),
            });
        }
        if request.direction() != Direction::Request
            || response.direction() != Direction::PositiveResponse
        {
            return Err(RegistryError::ServiceConflict {
                service_id: request_id,
                reason: "shape directions do not form a request/response pair".to_string(),
            });
        }
        self.ensure_free(request_id)?;
        self.ensure_free(response_id)?;

        self.slots[usize::from(request_id)] = Some(request);
        self.slots[usize::from(response_id)] = Some(response);
        Ok(())
    }

    /// Register the negative response envelope at 0x7F
    pub fn negative_response(&mut self, shape: MessageShape) -> Result<(), RegistryError> {
        if shape.service_id() != NEGATIVE_RESPONSE
            || shape.direction() != Direction::NegativeResponse
        {
            return Err(RegistryError::ServiceConflict {
                service_id: shape.service_id(),
                reason: "negative response must use id 0x7F".to_string(),
            });
        }
        self.ensure_free(NEGATIVE_RESPONSE)?;
        self.slots[usize::from(NEGATIVE_RESPONSE)] = Some(shape);
        Ok(())
    }

    pub fn lookup(&self, service_id: u8) -> Option<&MessageShape> {
        self.slots[usize::from(service_id)].as_ref()
    }

    pub fn contains(&self, service_id: u8) -> bool {
        self.lookup(service_id).is_some()
    }

    /// Number of registered shapes
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered shapes in ascending id order
    pub fn shapes(&self) -> impl Iterator<Item = &MessageShape> + '_ {
        self.slots.iter().flatten()
    }

    /// Registered (request, positive response) pairs
    pub fn pairs(&self) -> impl Iterator<Item = (&MessageShape, &MessageShape)> + '_ {
        self.shapes()
            .filter(|s| s.direction() == Direction::Request)
            .filter_map(|req| {
                self.lookup(req.service_id() | RESPONSE_BIT)
                    .map(|resp| (req, resp))
            })
    }

    fn ensure_free(&self, service_id: u8) -> Result<(), RegistryError> {
        match self.lookup(service_id) {
            Some(existing) => Err(RegistryError::ServiceConflict {
                service_id,
                reason: format!("already registered as {}", existing.name()),
            }),
            None => Ok(()),
        }
    }
}
