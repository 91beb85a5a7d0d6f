//! The navigation bar shared by every page behind the log-in.

use maud::{Markup, html};

use crate::endpoints;

/// The top level views of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Expenses,
    MarriageGoal,
}

impl View {
    pub const ALL: [View; 2] = [View::Expenses, View::MarriageGoal];

    pub fn endpoint(&self) -> &'static str {
        match self {
            View::Expenses => endpoints::EXPENSES_VIEW,
            View::MarriageGoal => endpoints::MARRIAGE_VIEW,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Expenses => "Expenses",
            View::MarriageGoal => "Marriage Goal",
        }
    }
}

/// The navigation bar with one link per [View], the signed-in user's email
/// and a log-out link.
pub struct NavBar<'a> {
    active_view: View,
    user_email: &'a str,
}

impl<'a> NavBar<'a> {
    pub fn new(active_view: View, user_email: &'a str) -> Self {
        Self {
            active_view,
            user_email,
        }
    }

    pub fn into_html(self) -> Markup {
        let desktop_link_class = |is_current: bool| -> &'static str {
            if is_current {
                "block py-2 px-3 text-white bg-blue-700 rounded-sm lg:bg-transparent
                lg:text-blue-700 lg:p-0 dark:text-white lg:dark:text-blue-500"
            } else {
                "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100
                lg:hover:bg-transparent lg:border-0 lg:hover:text-blue-700 lg:p-0
                dark:text-white lg:dark:hover:text-blue-500 dark:hover:bg-gray-700
                dark:hover:text-white lg:dark:hover:bg-transparent"
            }
        };
        let bottom_link_class = |is_current: bool| -> &'static str {
            if is_current {
                "flex w-full min-w-0 items-center justify-center rounded-lg \
                bg-blue-50 px-2.5 py-2 text-xs font-semibold leading-tight \
                text-blue-700 shadow-sm sm:px-4 sm:text-sm \
                dark:bg-blue-900/30 dark:text-blue-200"
            } else {
                "flex w-full min-w-0 items-center justify-center rounded-lg \
                px-2.5 py-2 text-xs font-semibold leading-tight text-gray-600 \
                sm:px-4 sm:text-sm \
                hover:bg-blue-50/70 hover:text-blue-700 dark:text-gray-300 \
                dark:hover:bg-blue-900/20 dark:hover:text-blue-200"
            }
        };

        // Template adapted from https://flowbite.com/docs/components/navbar/#default-navbar
        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div
                    class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a
                        href=(endpoints::ROOT)
                        class="flex items-center space-x-3 rtl:space-x-reverse"
                    {
                        span
                            class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "FinTrack"
                        }
                    }

                    div class="hidden w-full lg:block lg:w-auto"
                    {
                        ul
                            class="font-medium flex flex-col p-4 lg:p-0 mt-4
                            border border-gray-100 rounded bg-gray-50
                            lg:flex-row lg:items-center lg:space-x-8 rtl:space-x-reverse lg:mt-0
                            lg:border-0 lg:bg-white dark:bg-gray-800
                            lg:dark:bg-gray-900 dark:border-gray-700"
                        {
                            @for view in View::ALL {
                                li {
                                    a
                                        href=(view.endpoint())
                                        class=(desktop_link_class(view == self.active_view))
                                        aria-current=[(view == self.active_view).then_some("page")]
                                    {
                                        (view.title())
                                    }
                                }
                            }

                            li class="text-sm text-gray-500 dark:text-gray-400" { (self.user_email) }

                            li {
                                a href=(endpoints::LOG_OUT) class=(desktop_link_class(false))
                                {
                                    "Log out"
                                }
                            }
                        }
                    }
                }
            }

            nav class="fixed inset-x-0 bottom-0 z-40 lg:hidden"
            {
                div class="mx-auto max-w-screen-xl px-4 pb-4"
                {
                    div
                        class="rounded-xl border border-gray-200 bg-white/95
                        shadow-lg backdrop-blur dark:border-gray-700 dark:bg-gray-900/95"
                    {
                        ul
                            class="grid grid-cols-3 gap-2 px-4 py-3 text-xs font-semibold
                            text-gray-600 dark:text-gray-300"
                            aria-label="Primary"
                        {
                            @for view in View::ALL {
                                li class="min-w-0" {
                                    a
                                        href=(view.endpoint())
                                        class=(bottom_link_class(view == self.active_view))
                                        aria-current=[(view == self.active_view).then_some("page")]
                                    {
                                        span class="truncate" { (view.title()) }
                                    }
                                }
                            }

                            li class="min-w-0" {
                                a href=(endpoints::LOG_OUT) class=(bottom_link_class(false))
                                {
                                    span class="truncate" { "Log out" }
                                }
                            }
                        }
                    }
                }
            }
        )
    }
}

#[cfg(test)]
mod nav_bar_tests {
    use scraper::{Html, Selector};

    use crate::{
        endpoints,
        navigation::{NavBar, View},
    };

    fn current_links(html: &Html) -> Vec<String> {
        html.select(&Selector::parse("a[aria-current=page]").unwrap())
            .filter_map(|link| link.value().attr("href").map(str::to_owned))
            .collect()
    }

    #[test]
    fn marks_only_active_view() {
        for view in View::ALL {
            let markup = NavBar::new(view, "me@example.com").into_html();
            let html = Html::parse_fragment(&markup.into_string());

            let links = current_links(&html);

            // One link in the desktop bar and one in the bottom bar.
            assert_eq!(links.len(), 2, "want 2 active links for {view:?}");
            assert!(links.iter().all(|href| href == view.endpoint()));
        }
    }

    #[test]
    fn shows_email_and_log_out_link() {
        let markup = NavBar::new(View::Expenses, "me@example.com").into_html();
        let html = Html::parse_fragment(&markup.into_string());

        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("me@example.com"));

        let log_out_links = html
            .select(&Selector::parse("a").unwrap())
            .filter(|link| link.value().attr("href") == Some(endpoints::LOG_OUT))
            .count();
        assert_eq!(log_out_links, 2);
    }

    #[test]
    fn view_endpoints_are_distinct() {
        assert_ne!(View::Expenses.endpoint(), View::MarriageGoal.endpoint());
        assert_eq!(View::MarriageGoal.title(), "Marriage Goal");
    }
}
