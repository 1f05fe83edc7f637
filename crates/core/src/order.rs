//! Product order requests submitted from the shop page.

use std::fmt::Write;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::contact::{check_length, sanitize_html, EMAIL_PATTERN, MAX_EMAIL_CHARS};

pub const MAX_ORDER_ITEMS: usize = 20;
pub const MAX_ITEM_QUANTITY: u32 = 100;
pub const MAX_NOTES_CHARS: usize = 500;

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 ()-]{5,19}$").expect("phone pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("Name is required")]
    NameRequired,
    #[error("Name must be between 2 and 100 characters")]
    NameLength,
    #[error("Email is required")]
    EmailRequired,
    #[error("Please provide a valid email address")]
    EmailInvalid,
    #[error("Phone number is required")]
    PhoneRequired,
    #[error("Please provide a valid phone number")]
    PhoneInvalid,
    #[error("An order needs at least one item")]
    NoItems,
    #[error("An order can have at most 20 items")]
    TooManyItems,
    #[error("Item {0}: quantity must be between 1 and 100")]
    Quantity(usize),
    #[error("Item {0}: color is required")]
    ColorRequired(usize),
    #[error("Item {0}: size is required")]
    SizeRequired(usize),
    #[error("Item {0}: notes cannot be more than 500 characters")]
    NotesTooLong(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_notes: Option<String>,
}

/// An order as posted by a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
    #[serde(default)]
    pub client_info: ClientInfo,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// A stored order. Free-text fields hold sanitized HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub client_info: ClientInfo,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
}

impl OrderSubmission {
    /// Every rule the order breaks; item errors carry the 1-based item number.
    pub fn validate(&self) -> Vec<OrderError> {
        let mut errors = Vec::new();
        let client = &self.client_info;

        check_length(
            &client.name,
            2..=100,
            OrderError::NameRequired,
            OrderError::NameLength,
            &mut errors,
        );

        let email = client.email.trim();
        if email.is_empty() {
            errors.push(OrderError::EmailRequired);
        } else if email.len() > MAX_EMAIL_CHARS || !EMAIL_PATTERN.is_match(email) {
            errors.push(OrderError::EmailInvalid);
        }

        let phone = client.phone.trim();
        if phone.is_empty() {
            errors.push(OrderError::PhoneRequired);
        } else if !PHONE_PATTERN.is_match(phone) {
            errors.push(OrderError::PhoneInvalid);
        }

        if self.items.is_empty() {
            errors.push(OrderError::NoItems);
        } else if self.items.len() > MAX_ORDER_ITEMS {
            errors.push(OrderError::TooManyItems);
        }

        for (index, item) in self.items.iter().take(MAX_ORDER_ITEMS).enumerate() {
            let number = index + 1;
            if !(1..=MAX_ITEM_QUANTITY).contains(&item.quantity) {
                errors.push(OrderError::Quantity(number));
            }
            if item.color.trim().is_empty() {
                errors.push(OrderError::ColorRequired(number));
            }
            if item.size.trim().is_empty() {
                errors.push(OrderError::SizeRequired(number));
            }
            let notes = item.custom_notes.as_deref().unwrap_or_default();
            if notes.trim().chars().count() > MAX_NOTES_CHARS {
                errors.push(OrderError::NotesTooLong(number));
            }
        }

        errors
    }

    /// Sanitize and stamp the order for storage. Blank notes become `None`.
    pub fn into_order(self, now: DateTime<Utc>) -> Order {
        let client_info = ClientInfo {
            name: sanitize_html(&self.client_info.name),
            email: self.client_info.email.trim().to_lowercase(),
            phone: self.client_info.phone.trim().to_string(),
        };
        let items = self
            .items
            .into_iter()
            .map(|item| OrderItem {
                quantity: item.quantity,
                color: sanitize_html(&item.color),
                size: sanitize_html(&item.size),
                custom_notes: item
                    .custom_notes
                    .filter(|notes| !notes.trim().is_empty())
                    .map(|notes| sanitize_html(&notes)),
            })
            .collect();

        Order {
            id: Uuid::now_v7(),
            client_info,
            items,
            created_at: now,
        }
    }
}

impl Order {
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Plain-text rendering for the fulfilment log.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let client = &self.client_info;
        let _ = writeln!(out, "Name: {}", client.name);
        let _ = writeln!(out, "Email: {}", client.email);
        let _ = writeln!(out, "Phone: {}", client.phone);
        for (index, item) in self.items.iter().enumerate() {
            let _ = writeln!(out, "--- Item {} ---", index + 1);
            let _ = writeln!(out, "Quantity: {}", item.quantity);
            let _ = writeln!(out, "Color: {}", item.color);
            let _ = writeln!(out, "Size: {}", item.size);
            let notes = item.custom_notes.as_deref().unwrap_or("N/A");
            let _ = writeln!(out, "Custom Notes: {notes}");
        }
        out
    }
}
