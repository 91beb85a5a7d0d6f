//! The link between two partners and the rules for creating, accepting and
//! removing it.
//!
//! A user has no connection, a pending one (as the sender or the receiver of
//! the invite) or an accepted one. Only the receiver can accept a pending
//! invite and either party can remove the connection at any time.

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    Error,
    backend::{Collection, DataStore, Filter, Select, Session, parse_rows},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
}

impl ConnectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionStatus::Pending => "pending",
            ConnectionStatus::Accepted => "accepted",
        }
    }
}

/// A row in the `connections` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: i64,
    pub sender_email: String,
    pub receiver_email: String,
    pub status: ConnectionStatus,
    #[serde(default)]
    pub target_amount: Option<f64>,
    #[serde(default)]
    pub monthly_goal: Option<f64>,
}

impl Connection {
    pub fn is_sender(&self, email: &str) -> bool {
        self.sender_email.eq_ignore_ascii_case(email)
    }

    pub fn is_receiver(&self, email: &str) -> bool {
        self.receiver_email.eq_ignore_ascii_case(email)
    }

    pub fn involves(&self, email: &str) -> bool {
        self.is_sender(email) || self.is_receiver(email)
    }

    /// The email of the other party.
    pub fn partner_email(&self, email: &str) -> &str {
        if self.is_sender(email) {
            &self.receiver_email
        } else {
            &self.sender_email
        }
    }
}

/// Where the signed-in user stands with their partner.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    /// No invite has been sent or received.
    Unlinked,
    /// The user sent an invite that has not been accepted yet.
    InviteSent(Connection),
    /// The user received an invite that they have not accepted yet.
    InviteReceived(Connection),
    /// Both partners are linked and share a savings goal.
    Linked(Connection),
}

impl ConnectionState {
    pub fn new(connection: Option<Connection>, email: &str) -> Self {
        match connection {
            None => ConnectionState::Unlinked,
            Some(connection) => match connection.status {
                ConnectionStatus::Accepted => ConnectionState::Linked(connection),
                ConnectionStatus::Pending if connection.is_sender(email) => {
                    ConnectionState::InviteSent(connection)
                }
                ConnectionStatus::Pending => ConnectionState::InviteReceived(connection),
            },
        }
    }
}

/// Check an invite before contacting the backend.
///
/// # Errors
///
/// - [Error::InvalidEmail] if `partner_email` is not an email address.
/// - [Error::SelfInvite] if `partner_email` is the user's own email.
pub fn check_invite(own_email: &str, partner_email: &str) -> Result<(), Error> {
    if !EmailAddress::is_valid(partner_email) {
        return Err(Error::InvalidEmail(partner_email.to_owned()));
    }

    if partner_email.eq_ignore_ascii_case(own_email) {
        return Err(Error::SelfInvite);
    }

    Ok(())
}

/// Only the receiver of a pending invite may accept it.
pub fn check_accept(connection: &Connection, email: &str) -> Result<(), Error> {
    if connection.status == ConnectionStatus::Pending && connection.is_receiver(email) {
        Ok(())
    } else {
        Err(Error::NotInvitee)
    }
}

/// The checked values from the goal settings form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Goal {
    pub target_amount: f64,
    pub monthly_goal: f64,
}

impl Goal {
    /// Parse the goal settings. A blank monthly goal means no monthly goal.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidGoal] if the target is not greater than zero or
    /// the monthly goal is negative.
    pub fn parse(target_amount: &str, monthly_goal: &str) -> Result<Self, Error> {
        let target_amount = target_amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|target| target.is_finite() && *target > 0.0)
            .ok_or_else(|| {
                Error::InvalidGoal("The target amount must be a number greater than zero.".to_owned())
            })?;

        let monthly_goal = match monthly_goal.trim() {
            "" => 0.0,
            text => text
                .parse::<f64>()
                .ok()
                .filter(|goal| goal.is_finite() && *goal >= 0.0)
                .ok_or_else(|| {
                    Error::InvalidGoal("The monthly goal must be zero or more.".to_owned())
                })?,
        };

        Ok(Self {
            target_amount,
            monthly_goal,
        })
    }
}

/// Fetch the connection the signed-in user is part of, if any.
pub async fn get_connection(
    store: &dyn DataStore,
    session: &Session,
) -> Result<Option<Connection>, Error> {
    let email = &session.user.email;
    let query = Select::from(Collection::Connections)
        .filter(Filter::any_of(vec![
            Filter::eq_ignore_case("sender_email", email),
            Filter::eq_ignore_case("receiver_email", email),
        ]))
        .order_asc("id")
        .limit(1);

    let connections: Vec<Connection> = parse_rows(store.select(session, &query).await?)?;

    Ok(connections.into_iter().next())
}

async fn is_registered(store: &dyn DataStore, session: &Session, email: &str) -> Result<bool, Error> {
    let query = Select::from(Collection::Profiles)
        .filter(Filter::eq_ignore_case("email", email))
        .limit(1);

    Ok(!store.select(session, &query).await?.is_empty())
}

/// Invite `partner_email` to share a savings goal.
///
/// # Errors
///
/// Besides the errors from [check_invite], returns [Error::AlreadyConnected]
/// if the user already has a connection and [Error::UnknownPartner] if no
/// user is registered with `partner_email`.
pub async fn send_invite(
    store: &dyn DataStore,
    session: &Session,
    partner_email: &str,
) -> Result<(), Error> {
    let partner_email = partner_email.trim();
    check_invite(&session.user.email, partner_email)?;

    if get_connection(store, session).await?.is_some() {
        return Err(Error::AlreadyConnected);
    }

    if !is_registered(store, session, partner_email).await? {
        return Err(Error::UnknownPartner(partner_email.to_owned()));
    }

    let row = json!({
        "sender_email": session.user.email,
        "receiver_email": partner_email,
        "status": ConnectionStatus::Pending.as_str(),
    });

    store.insert(session, Collection::Connections, row).await
}

/// Accept the pending invite with `id`.
pub async fn accept_invite(store: &dyn DataStore, session: &Session, id: i64) -> Result<(), Error> {
    let connection = get_connection(store, session)
        .await?
        .filter(|connection| connection.id == id)
        .ok_or(Error::UpdateMissingConnection)?;

    check_accept(&connection, &session.user.email)?;

    let updated = store
        .update(
            session,
            Collection::Connections,
            &[
                Filter::eq("id", id),
                Filter::eq("status", ConnectionStatus::Pending.as_str()),
            ],
            json!({ "status": ConnectionStatus::Accepted.as_str() }),
        )
        .await?;

    match updated {
        0 => Err(Error::UpdateMissingConnection),
        _ => Ok(()),
    }
}

/// Remove the connection with `id`, whether pending or accepted.
///
/// Either party may do this. Cancelling, declining and unlinking are all the
/// same operation.
pub async fn remove_connection(
    store: &dyn DataStore,
    session: &Session,
    id: i64,
) -> Result<(), Error> {
    let connection = get_connection(store, session)
        .await?
        .filter(|connection| connection.id == id && connection.involves(&session.user.email))
        .ok_or(Error::DeleteMissingConnection)?;

    let deleted = store
        .delete(session, Collection::Connections, &[Filter::eq("id", connection.id)])
        .await?;

    match deleted {
        0 => Err(Error::DeleteMissingConnection),
        _ => Ok(()),
    }
}

/// Set the savings target and monthly goal of the accepted connection `id`.
pub async fn update_goal(
    store: &dyn DataStore,
    session: &Session,
    id: i64,
    goal: Goal,
) -> Result<(), Error> {
    let connection = get_connection(store, session)
        .await?
        .filter(|connection| connection.id == id)
        .ok_or(Error::UpdateMissingConnection)?;

    if connection.status != ConnectionStatus::Accepted {
        return Err(Error::NotConnected);
    }

    let updated = store
        .update(
            session,
            Collection::Connections,
            &[Filter::eq("id", id)],
            json!({
                "target_amount": goal.target_amount,
                "monthly_goal": goal.monthly_goal,
            }),
        )
        .await?;

    match updated {
        0 => Err(Error::UpdateMissingConnection),
        _ => Ok(()),
    }
}
