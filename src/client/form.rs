//! The form fields shared by the new client and edit client pages.

use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    client::ClientDetails,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
};

/// The form data for creating or updating a client.
#[derive(Debug, Deserialize)]
pub struct ClientForm {
    pub name: String,
    pub email: String,
    /// The new password. When editing, an empty password keeps the old one.
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
}

impl ClientForm {
    /// Split the form into the client's details and the raw password.
    pub fn into_parts(self) -> (ClientDetails, String) {
        let details = ClientDetails {
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
        };

        (details, self.password)
    }
}

fn text_input(name: &str, label: &str, input_type: &str, value: &str, required: bool) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                id=(name)
                type=(input_type)
                name=(name)
                value=(value)
                required[required]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

/// The inputs for a client's details and password.
///
/// The password is only required for new clients.
pub fn client_form_fields(details: &ClientDetails, is_new_client: bool) -> Markup {
    html! {
        (text_input("name", "Name", "text", &details.name, true))
        (text_input("email", "Email", "email", &details.email, true))

        div
        {
            label for="password" class=(FORM_LABEL_STYLE) { "Password" }

            input
                id="password"
                type="password"
                name="password"
                placeholder="••••••••"
                required[is_new_client]
                class=(FORM_TEXT_INPUT_STYLE);

            @if !is_new_client {
                p class="mt-1 text-sm text-gray-500 dark:text-gray-400"
                {
                    "Leave blank to keep the current password."
                }
            }
        }

        (text_input("phone", "Phone", "tel", &details.phone, false))
        (text_input("address", "Address", "text", &details.address, false))

        div class="grid grid-cols-3 gap-2"
        {
            (text_input("city", "City", "text", &details.city, false))
            (text_input("state", "State", "text", &details.state, false))
            (text_input("zip_code", "Zip code", "text", &details.zip_code, false))
        }
    }
}
