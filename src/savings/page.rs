//! The marriage goal page, which looks different for each step of linking
//! with a partner.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::Date;

use crate::{
    Error,
    backend::Session,
    charts::{charts_script, charts_view},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DANGER_STYLE, BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE,
        CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        currency_rounded_with_tooltip, format_currency_rounded, rupiah_input_styles,
    },
    navigation::{NavBar, View},
    savings::{
        SavingsState,
        charts::contribution_chart,
        connection::{Connection, ConnectionState, get_connection},
        progress::{GoalProgress, contribution_history},
        saving::{Saving, get_savings},
    },
    timezone::local_today,
};

/// How many of the latest contributions are listed under the chart.
const RECENT_CONTRIBUTIONS: usize = 10;

/// Renders the marriage goal page for the signed-in user.
pub async fn get_marriage_page(
    State(state): State<SavingsState>,
    Extension(session): Extension<Session>,
) -> Response {
    match marriage_page(&state, &session).await {
        Ok(page) => page.into_response(),
        Err(error) => {
            tracing::error!("Could not render the marriage goal page: {error}");
            error.into_response()
        }
    }
}

async fn marriage_page(state: &SavingsState, session: &Session) -> Result<Markup, Error> {
    let email = &session.user.email;
    let connection = get_connection(state.store.as_ref(), session).await?;

    let (content, head_elements) = match ConnectionState::new(connection, email) {
        ConnectionState::Unlinked => (unlinked_view(), Vec::new()),
        ConnectionState::InviteSent(connection) => (invite_sent_view(&connection, email), Vec::new()),
        ConnectionState::InviteReceived(connection) => {
            (invite_received_view(&connection, email), Vec::new())
        }
        ConnectionState::Linked(connection) => {
            let today = local_today(&state.local_timezone)?;
            let savings = get_savings(state.store.as_ref(), session, &connection).await?;
            let charts = [contribution_chart(&contribution_history(&savings, email))];

            let mut head_elements = vec![rupiah_input_styles()];
            head_elements.extend(charts_script(&charts));

            let content = html! {
                (linked_view(&connection, email, &savings, today))
                (charts_view(&charts))
                (recent_contributions_view(&savings, email))
                (unlink_view(&connection))
            };

            (content, head_elements)
        }
    };

    let content = html! {
        (NavBar::new(View::MarriageGoal, email).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-3xl" { (content) }
        }
    };

    Ok(base("Marriage Goal", &head_elements, &content))
}

fn unlinked_view() -> Markup {
    html! {
        section class={(CARD_STYLE) " text-center"}
        {
            h1 class="text-2xl font-bold mb-2" { "Marriage Savings Goal" }
            p class="text-gray-600 dark:text-gray-400 mb-6"
            {
                "Link with your partner to start tracking a shared goal."
            }

            form
                hx-post=(endpoints::CONNECTIONS_API)
                hx-target-error="#alert-container"
                class="flex flex-col gap-4 max-w-sm mx-auto text-left"
            {
                div
                {
                    label for="partner_email" class=(FORM_LABEL_STYLE) { "Partner's email" }
                    input
                        type="email"
                        id="partner_email"
                        name="partner_email"
                        placeholder="partner@example.com"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Invite" }
            }
        }
    }
}

fn invite_sent_view(connection: &Connection, email: &str) -> Markup {
    html! {
        section class={(CARD_STYLE) " text-center"}
        {
            h1 class="text-2xl font-bold mb-2" { "Invite Pending" }
            p class="text-gray-600 dark:text-gray-400 mb-6"
            {
                "Waiting for " (connection.partner_email(email)) " to accept."
            }

            div class="max-w-xs mx-auto"
            {
                button
                    type="button"
                    hx-delete=(format_endpoint(endpoints::CONNECTION, connection.id))
                    hx-swap="none"
                    hx-target-error="#alert-container"
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    "Cancel Invite"
                }
            }
        }
    }
}

fn invite_received_view(connection: &Connection, email: &str) -> Markup {
    html! {
        section class={(CARD_STYLE) " text-center"}
        {
            h1 class="text-2xl font-bold mb-2"
            {
                (connection.partner_email(email)) " invited you!"
            }
            p class="text-gray-600 dark:text-gray-400 mb-6"
            {
                "Accept to share a savings goal with your partner."
            }

            div class="grid grid-cols-2 gap-4 max-w-sm mx-auto"
            {
                button
                    type="button"
                    hx-post=(format_endpoint(endpoints::ACCEPT_CONNECTION, connection.id))
                    hx-swap="none"
                    hx-target-error="#alert-container"
                    class=(BUTTON_PRIMARY_STYLE)
                {
                    "Accept Invite"
                }

                button
                    type="button"
                    hx-delete=(format_endpoint(endpoints::CONNECTION, connection.id))
                    hx-confirm="Decline this invite?"
                    hx-swap="none"
                    hx-target-error="#alert-container"
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    "Decline"
                }
            }
        }
    }
}

fn linked_view(connection: &Connection, email: &str, savings: &[Saving], today: Date) -> Markup {
    let progress = GoalProgress::new(
        savings,
        connection.target_amount,
        connection.monthly_goal,
        today,
    );

    html! {
        h1 class="text-2xl font-bold mb-1" { "Joint Savings" }
        p class="text-gray-600 dark:text-gray-400 mb-6"
        {
            "Shared goal with " (connection.partner_email(email))
        }

        (progress_view(&progress))

        div class="grid gap-4 md:grid-cols-2 mb-6"
        {
            (deposit_form())
            (goal_form(connection, &progress))
        }
    }
}

fn progress_view(progress: &GoalProgress) -> Markup {
    let percent = format!("{:.1}%", progress.percent);

    html! {
        section class={(CARD_STYLE) " mb-6"} aria-label="Progress"
        {
            div class="flex justify-between items-end mb-2"
            {
                div
                {
                    p class="text-sm text-gray-600 dark:text-gray-400" { "Total Saved" }
                    p class="text-2xl font-bold" data-stat="Total Saved"
                    {
                        (currency_rounded_with_tooltip(progress.current))
                    }
                }

                div class="text-right"
                {
                    p class="text-sm text-gray-600 dark:text-gray-400" { "Target" }
                    p class="text-lg font-semibold" data-stat="Target"
                    {
                        (currency_rounded_with_tooltip(progress.target))
                    }
                }
            }

            div
                class="w-full h-3 bg-gray-200 rounded-full dark:bg-gray-700"
                role="progressbar"
                aria-valuemin="0"
                aria-valuemax="100"
                aria-valuenow=(format!("{:.1}", progress.percent))
            {
                div class="h-3 bg-blue-500 rounded-full" style={"width: " (percent)} {}
            }

            p class="mt-2 text-sm text-gray-600 dark:text-gray-400" data-stat="Remaining"
            {
                (percent) " saved, " (format_currency_rounded(progress.remaining)) " to go"
            }

            @if let Some(completion) = progress.estimated_completion {
                p class="mt-1 text-sm text-gray-600 dark:text-gray-400" data-stat="Projection"
                {
                    (progress.months_left) " months left at "
                    (format_currency_rounded(progress.monthly_goal)) " a month, reaching the target around "
                    (completion.month()) " " (completion.year())
                }
            }
        }
    }
}

fn deposit_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::SAVINGS_API)
            hx-swap="none"
            hx-target-error="#alert-container"
            class={(CARD_STYLE) " flex flex-col gap-4"}
        {
            h2 class="text-lg font-semibold" { "Add Contribution" }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                div class="input-wrapper"
                {
                    input
                        type="number"
                        id="amount"
                        name="amount"
                        min="0"
                        step="any"
                        placeholder="0"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="note" class=(FORM_LABEL_STYLE) { "Note" }
                input
                    type="text"
                    id="note"
                    name="note"
                    placeholder="Optional"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add to Pot" }
        }
    }
}

fn goal_form(connection: &Connection, progress: &GoalProgress) -> Markup {
    html! {
        form
            hx-put=(format_endpoint(endpoints::CONNECTION_GOAL, connection.id))
            hx-swap="none"
            hx-target-error="#alert-container"
            class={(CARD_STYLE) " flex flex-col gap-4"}
        {
            h2 class="text-lg font-semibold" { "Goal Settings" }

            div
            {
                label for="target_amount" class=(FORM_LABEL_STYLE) { "Target Amount" }
                div class="input-wrapper"
                {
                    input
                        type="number"
                        id="target_amount"
                        name="target_amount"
                        min="0"
                        step="any"
                        value=(progress.target)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="monthly_goal" class=(FORM_LABEL_STYLE) { "Monthly Goal" }
                div class="input-wrapper"
                {
                    input
                        type="number"
                        id="monthly_goal"
                        name="monthly_goal"
                        min="0"
                        step="any"
                        value=(progress.monthly_goal)
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Save Goal" }
        }
    }
}

fn recent_contributions_view(savings: &[Saving], email: &str) -> Markup {
    html! {
        section class="w-full my-6"
        {
            h2 class="text-lg font-semibold mb-4" { "Recent Contributions" }

            @if savings.is_empty() {
                p class="text-gray-600 dark:text-gray-400" { "No contributions yet." }
            } @else {
                div class="relative overflow-x-auto shadow-md rounded-lg"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Who" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Note" }
                                th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                            }
                        }

                        tbody
                        {
                            @for saving in savings.iter().take(RECENT_CONTRIBUTIONS) {
                                @let is_mine = saving.saver_email.eq_ignore_ascii_case(email);

                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE) { (saving.date) }
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        @if is_mine { "Me" } @else { "Partner" }
                                    }
                                    td class=(TABLE_CELL_STYLE) { (saving.notes.as_deref().unwrap_or("")) }
                                    td class={(TABLE_CELL_STYLE) " text-right font-medium"}
                                    {
                                        (currency_rounded_with_tooltip(saving.amount))
                                    }
                                    td class={(TABLE_CELL_STYLE) " text-right"}
                                    {
                                        @if is_mine {
                                            button
                                                type="button"
                                                hx-delete=(format_endpoint(endpoints::SAVING, saving.id))
                                                hx-confirm="Delete this contribution?"
                                                hx-swap="none"
                                                hx-target-error="#alert-container"
                                                class=(BUTTON_DELETE_STYLE)
                                            {
                                                "Delete"
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn unlink_view(connection: &Connection) -> Markup {
    html! {
        div class="max-w-xs mx-auto mt-8"
        {
            button
                type="button"
                hx-delete=(format_endpoint(endpoints::CONNECTION, connection.id))
                hx-confirm="Are you sure? This will disconnect you from your partner."
                hx-swap="none"
                hx-target-error="#alert-container"
                class=(BUTTON_DANGER_STYLE)
            {
                "Disconnect & Unlink Partner"
            }
        }
    }
}

#[cfg(test)]
mod marriage_page_tests {
    use std::sync::Arc;

    use axum::{Extension, extract::State, http::StatusCode};
    use scraper::{Html, Selector};
    use serde_json::json;

    use crate::{
        Error,
        backend::Collection,
        endpoints::{self, format_endpoint},
        savings::test_savings_state,
        test_utils::{
            MemoryStore, assert_form_input, assert_form_submit_button_with_text, assert_hx_endpoint,
            assert_valid_html, must_get_form, parse_html_document, test_session,
        },
    };

    use super::get_marriage_page;

    const ME: &str = "me@example.com";
    const PARTNER: &str = "partner@example.com";

    async fn get_page(store: Arc<MemoryStore>) -> Html {
        let response = get_marriage_page(
            State(test_savings_state(store)),
            Extension(test_session("user-me", ME)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        html
    }

    fn seed_connection(store: &MemoryStore, sender: &str, receiver: &str, status: &str) -> i64 {
        store.seed(
            Collection::Connections,
            json!({
                "sender_email": sender,
                "receiver_email": receiver,
                "status": status,
                "target_amount": 1000.0,
                "monthly_goal": 100.0,
            }),
        )
    }

    fn text(html: &Html) -> String {
        html.root_element().text().collect()
    }

    fn select_attr(html: &Html, selector: &str, attr: &str) -> Vec<String> {
        html.select(&Selector::parse(selector).unwrap())
            .filter_map(|element| element.value().attr(attr).map(str::to_owned))
            .collect()
    }

    #[tokio::test]
    async fn unlinked_user_sees_invite_form() {
        let html = get_page(Arc::new(MemoryStore::default())).await;

        assert!(text(&html).contains("Link with your partner to start tracking a shared goal."));
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::CONNECTIONS_API, "hx-post");
        assert_form_input(&form, "partner_email", "email");
        assert_form_submit_button_with_text(&form, "Invite");
    }

    #[tokio::test]
    async fn sender_sees_pending_invite() {
        let store = Arc::new(MemoryStore::default());
        let id = seed_connection(&store, ME, PARTNER, "pending");

        let html = get_page(store).await;

        assert!(text(&html).contains("Waiting for partner@example.com to accept."));
        assert_eq!(
            select_attr(&html, "button[hx-delete]", "hx-delete"),
            [format_endpoint(endpoints::CONNECTION, id)]
        );
        assert!(select_attr(&html, "button[hx-post]", "hx-post").is_empty());
    }

    #[tokio::test]
    async fn receiver_can_accept_or_decline() {
        let store = Arc::new(MemoryStore::default());
        let id = seed_connection(&store, PARTNER, ME, "pending");

        let html = get_page(store).await;

        assert!(text(&html).contains("partner@example.com invited you!"));
        assert_eq!(
            select_attr(&html, "button[hx-post]", "hx-post"),
            [format_endpoint(endpoints::ACCEPT_CONNECTION, id)]
        );
        assert_eq!(
            select_attr(&html, "button[hx-delete]", "hx-delete"),
            [format_endpoint(endpoints::CONNECTION, id)]
        );
    }

    #[tokio::test]
    async fn linked_user_sees_progress_and_contributions() {
        let store = Arc::new(MemoryStore::default());
        let id = seed_connection(&store, PARTNER, ME, "accepted");
        let my_saving = store.seed(
            Collection::MarriageSavings,
            json!({
                "date": "2025-03-01T10:00:00+00:00",
                "amount": 300.0,
                "notes": "Bonus",
                "user_id": "user-me",
                "saver_email": ME,
            }),
        );
        store.seed(
            Collection::MarriageSavings,
            json!({
                "date": "2025-03-02T10:00:00+00:00",
                "amount": 200.0,
                "notes": null,
                "user_id": "user-partner",
                "saver_email": PARTNER,
            }),
        );

        let html = get_page(store).await;
        let page_text = text(&html);

        assert!(page_text.contains("Shared goal with partner@example.com"));
        assert!(page_text.contains("50.0% saved"));
        assert!(page_text.contains("5 months left"));
        assert!(html.root_element().html().contains("Contribution History"));
        assert_eq!(
            select_attr(&html, "button[hx-delete]", "hx-delete"),
            [
                format_endpoint(endpoints::SAVING, my_saving),
                format_endpoint(endpoints::CONNECTION, id),
            ]
        );
        assert_eq!(
            select_attr(&html, "form[hx-put]", "hx-put"),
            [format_endpoint(endpoints::CONNECTION_GOAL, id)]
        );
        assert_eq!(
            select_attr(&html, "form[hx-post]", "hx-post"),
            [endpoints::SAVINGS_API]
        );
    }

    #[tokio::test]
    async fn linked_user_without_monthly_goal_has_no_projection() {
        let store = Arc::new(MemoryStore::default());
        store.seed(
            Collection::Connections,
            json!({ "sender_email": ME, "receiver_email": PARTNER, "status": "accepted" }),
        );

        let html = get_page(store).await;

        assert!(text(&html).contains("0.0% saved"));
        assert!(select_attr(&html, "[data-stat='Projection']", "data-stat").is_empty());
    }

    #[tokio::test]
    async fn backend_failure_renders_error_page() {
        let store = Arc::new(MemoryStore::default());
        store.fail_with(Error::Transport("connection refused".to_owned()));

        let response = get_marriage_page(
            State(test_savings_state(store)),
            Extension(test_session("user-me", ME)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
