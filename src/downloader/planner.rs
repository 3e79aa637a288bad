// Attempt planning: clients x auth contexts
//
// Unauthenticated attempts always come first, one per client. Each cookie
// browser then gets one attempt per client, in browser order.

use super::models::{Attempt, AttemptPlan, AuthContext, ClientCandidate};

pub fn plan(clients: &[ClientCandidate], cookie_browsers: &[String]) -> AttemptPlan {
    let auth_contexts = std::iter::once(AuthContext::NoAuth).chain(
        cookie_browsers
            .iter()
            .map(|browser| AuthContext::CookieSource(browser.clone())),
    );

    let attempts = auth_contexts
        .flat_map(|auth| {
            clients
                .iter()
                .map(move |client| Attempt::new(client.clone(), auth.clone()))
        })
        .collect();

    AttemptPlan::new(attempts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(plan: &AttemptPlan) -> Vec<(String, String)> {
        plan.attempts()
            .iter()
            .map(|a| (a.client.to_string(), a.auth.label()))
            .collect()
    }

    #[test]
    fn test_plan_tries_without_cookies_first() {
        let clients = vec![ClientCandidate::named("c1"), ClientCandidate::named("c2")];
        let browsers = vec!["b1".to_string(), "b2".to_string()];

        let plan = plan(&clients, &browsers);

        let expected: Vec<(String, String)> = [
            ("c1", "none"),
            ("c2", "none"),
            ("c1", "cookies:b1"),
            ("c2", "cookies:b1"),
            ("c1", "cookies:b2"),
            ("c2", "cookies:b2"),
        ]
        .iter()
        .map(|(c, a)| (c.to_string(), a.to_string()))
        .collect();
        assert_eq!(pairs(&plan), expected);
    }

    #[test]
    fn test_plan_without_cookies_has_only_plain_attempts() {
        let clients = vec![ClientCandidate::named("web"), ClientCandidate::auto()];
        let plan = plan(&clients, &[]);

        assert_eq!(plan.len(), 2);
        assert!(plan
            .attempts()
            .iter()
            .all(|a| a.auth == AuthContext::NoAuth));
        assert_eq!(plan.attempts()[1].client, ClientCandidate::auto());
    }

    #[test]
    fn test_plan_size_is_clients_times_auth_contexts() {
        let clients = vec![
            ClientCandidate::named("web"),
            ClientCandidate::named("ios"),
            ClientCandidate::named("tv"),
        ];
        let browsers = vec!["chrome".to_string(), "firefox".to_string()];
        assert_eq!(plan(&clients, &browsers).len(), 3 + 3 * 2);
    }
}
