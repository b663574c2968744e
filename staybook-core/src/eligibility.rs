use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::models::{Ticket, TicketStatus, UserId};
use crate::repository::{EnrollmentRepository, TicketRepository};
use crate::{CoreError, CoreResult};

/// Why a user's ticket does not entitle them to a hotel room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IneligibleReason {
    NoEnrollment,
    NoTicket,
    TicketNotPaid,
    RemoteTicket,
    HotelNotIncluded,
}

impl fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            IneligibleReason::NoEnrollment => "user has no enrollment",
            IneligibleReason::NoTicket => "enrollment has no ticket",
            IneligibleReason::TicketNotPaid => "ticket is not paid",
            IneligibleReason::RemoteTicket => "ticket is for remote attendance",
            IneligibleReason::HotelNotIncluded => "ticket does not include a hotel",
        };
        f.write_str(msg)
    }
}

/// Ticket rules for hotel access: paid, in person, hotel included.
pub fn ticket_allows_hotel(ticket: &Ticket) -> Result<(), IneligibleReason> {
    if ticket.status == TicketStatus::Reserved {
        return Err(IneligibleReason::TicketNotPaid);
    }
    if ticket.ticket_type.is_remote {
        return Err(IneligibleReason::RemoteTicket);
    }
    if !ticket.ticket_type.includes_hotel {
        return Err(IneligibleReason::HotelNotIncluded);
    }
    Ok(())
}

#[derive(Clone)]
pub struct TicketEligibilityChecker {
    enrollments: Arc<dyn EnrollmentRepository>,
    tickets: Arc<dyn TicketRepository>,
}

impl TicketEligibilityChecker {
    pub fn new(enrollments: Arc<dyn EnrollmentRepository>, tickets: Arc<dyn TicketRepository>) -> Self {
        Self { enrollments, tickets }
    }

    /// Return the user's qualifying ticket, or `Ineligible` with the first rule that failed.
    pub async fn check_eligibility(&self, user_id: UserId) -> CoreResult<Ticket> {
        let enrollment = self
            .enrollments
            .find_with_address_by_user(user_id)
            .await?
            .ok_or(CoreError::Ineligible(IneligibleReason::NoEnrollment))?;

        let ticket = self
            .tickets
            .find_by_enrollment(enrollment.id)
            .await?
            .ok_or(CoreError::Ineligible(IneligibleReason::NoTicket))?;

        if let Err(reason) = ticket_allows_hotel(&ticket) {
            debug!(user_id, ticket_id = ticket.id, %reason, "Ticket rejected for hotel booking");
            return Err(CoreError::Ineligible(reason));
        }

        info!(
            user_id,
            ticket_id = ticket.id,
            ticket_type = %ticket.ticket_type.name,
            "Ticket qualifies for hotel booking"
        );
        Ok(ticket)
    }
}
