//! The log-in and sign-up forms.
//!
//! Both forms replace themselves with the server's response so that errors
//! and notices are shown in place.

use maud::{Markup, html};

use crate::{
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, loading_spinner,
    },
};

/// The minimum password length accepted by the sign-up form.
pub(crate) const PASSWORD_INPUT_MIN_LENGTH: u8 = 8;

struct Field<'a> {
    label: &'a str,
    type_: &'a str,
    name: &'a str,
    value: &'a str,
    autocomplete: &'a str,
    min_length: Option<u8>,
}

fn field(field: Field) -> Markup {
    html! {
        div
        {
            label for=(field.name) class=(FORM_LABEL_STYLE) { (field.label) }

            input
                type=(field.type_)
                name=(field.name)
                id=(field.name)
                autocomplete=(field.autocomplete)
                class=(FORM_TEXT_INPUT_STYLE)
                required
                value=(field.value)
                minlength=[field.min_length];
        }
    }
}

fn error_message(message: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = message {
            p class="text-red-500 text-base" { (message) }
        }
    }
}

fn submit_button(text: &str) -> Markup {
    html! {
        button
            type="submit" id="submit-button" tabindex="0"
            class=(BUTTON_PRIMARY_STYLE)
        {
            span class="inline htmx-indicator" id="indicator"
            {
                (loading_spinner())
            }
            (text)
        }
    }
}

/// The link to the sign-up form, carrying the page to return to after log-in.
fn sign_up_url(redirect_url: Option<&str>) -> String {
    let mut params = vec![("mode", "sign_up")];
    if let Some(redirect_url) = redirect_url {
        params.push(("redirect_url", redirect_url));
    }

    match serde_urlencoded::to_string(&params) {
        Ok(query) => format!("{}?{query}", endpoints::LOG_IN_VIEW),
        Err(error) => {
            tracing::error!("Could not encode sign-up link: {error}");
            endpoints::LOG_IN_VIEW.to_owned()
        }
    }
}

/// What to show in the log-in form.
#[derive(Default)]
pub(crate) struct LogInForm<'a> {
    pub email: &'a str,
    pub error_message: Option<&'a str>,
    /// Shown above the form in green, e.g. after signing up.
    pub notice: Option<&'a str>,
    pub redirect_url: Option<&'a str>,
}

pub(crate) fn log_in_form(form: LogInForm) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(notice) = form.notice {
                p class="text-green-600 dark:text-green-400 text-base" role="status" { (notice) }
            }

            @if let Some(redirect_url) = form.redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (field(Field {
                label: "Email",
                type_: "email",
                name: "email",
                value: form.email,
                autocomplete: "email",
                min_length: None,
            }))

            (field(Field {
                label: "Password",
                type_: "password",
                name: "password",
                value: "",
                autocomplete: "current-password",
                min_length: None,
            }))

            (error_message(form.error_message))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    tabindex="0"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            (submit_button("Log in"))

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Don't have an account? "
                a href=(sign_up_url(form.redirect_url)) class=(LINK_STYLE)
                {
                    "Sign up"
                }
            }
        }
    }
}

pub(crate) fn sign_up_form(email: &str, error: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::SIGN_UP_API)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            (field(Field {
                label: "Email",
                type_: "email",
                name: "email",
                value: email,
                autocomplete: "email",
                min_length: None,
            }))

            (field(Field {
                label: "Password",
                type_: "password",
                name: "password",
                value: "",
                autocomplete: "new-password",
                min_length: Some(PASSWORD_INPUT_MIN_LENGTH),
            }))

            (field(Field {
                label: "Confirm Password",
                type_: "password",
                name: "confirm_password",
                value: "",
                autocomplete: "new-password",
                min_length: Some(PASSWORD_INPUT_MIN_LENGTH),
            }))

            (error_message(error))

            (submit_button("Create account"))

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                a href=(endpoints::LOG_IN_VIEW) class=(LINK_STYLE) { "Log in" }
            }
        }
    }
}

#[cfg(test)]
mod form_tests {
    use scraper::{Html, Selector};

    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_input_with_value, assert_hx_endpoint, must_get_form,
        },
    };

    use super::{LogInForm, log_in_form, sign_up_form};

    #[test]
    fn log_in_form_has_email_and_password() {
        let html = Html::parse_fragment(&log_in_form(LogInForm::default()).into_string());
        let form = must_get_form(&html);

        assert_hx_endpoint(&form, endpoints::LOG_IN_API, "hx-post");
        assert_form_input(&form, "email", "email");
        assert_form_input(&form, "password", "password");
    }

    #[test]
    fn sign_up_link_keeps_redirect_url() {
        let html = Html::parse_fragment(
            &log_in_form(LogInForm {
                redirect_url: Some("/marriage"),
                ..Default::default()
            })
            .into_string(),
        );

        let link = html
            .select(&Selector::parse("a").unwrap())
            .next()
            .expect("No link found");
        assert_eq!(
            link.value().attr("href"),
            Some("/log_in?mode=sign_up&redirect_url=%2Fmarriage")
        );
    }

    #[test]
    fn sign_up_form_keeps_email() {
        let html = Html::parse_fragment(&sign_up_form("me@example.com", None).into_string());
        let form = must_get_form(&html);

        assert_hx_endpoint(&form, endpoints::SIGN_UP_API, "hx-post");
        assert_form_input_with_value(&form, "email", "email", "me@example.com");
        assert_form_input(&form, "confirm_password", "password");
    }
}
