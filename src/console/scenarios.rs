//! Built-in test inputs for each capability.

use std::time::Duration;

/// A named test input and what it is expected to exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestCase {
    pub label: &'static str,
    pub value: &'static str,
    pub description: &'static str,
    /// Whether the engine is expected to let it through.
    pub expect_allowed: bool,
}

const fn case(
    label: &'static str,
    value: &'static str,
    description: &'static str,
    expect_allowed: bool,
) -> TestCase {
    TestCase {
        label,
        value,
        description,
        expect_allowed,
    }
}

pub const BOT_CASES: &[TestCase] = &[
    case(
        "Regular Browser",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        "Standard Chrome browser user agent",
        true,
    ),
    case(
        "Mobile Browser",
        "Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Mobile/15E148 Safari/604.1",
        "iOS Safari mobile browser",
        true,
    ),
    case(
        "Google Bot",
        "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)",
        "Legitimate Google search crawler (allowed)",
        true,
    ),
    case("Basic Scraper", "Python-urllib/3.9", "Simple Python scraping script", false),
    case(
        "Fake Browser",
        "definitely-not-a-bot-chrome-browser-trust-me",
        "Poorly disguised bot",
        false,
    ),
    case("Known Bad Bot", "PetalBot", "Known aggressive crawler", false),
    case("Empty User Agent", "", "Missing user agent (suspicious)", false),
];

pub const SENSITIVE_INFO_CASES: &[TestCase] = &[
    case(
        "Product Review",
        "I absolutely love the wireless headphones I bought last week! The sound quality is amazing and battery life is great. Would definitely recommend to others.",
        "Standard product review without PII",
        true,
    ),
    case(
        "Support Query",
        "Having trouble connecting my device to Bluetooth. I've tried restarting it and following the manual but no luck. Can you help?",
        "Technical support question without sensitive data",
        true,
    ),
    case(
        "Order Status",
        "Hi, I placed an order last week for a blue t-shirt. Could you tell me when it will be shipped? Order #12345",
        "Order inquiry with non-sensitive reference number",
        true,
    ),
    case(
        "Refund Request with Email",
        "I ordered a hat from your store and would like to request a refund. Please contact me at john.smith@gmail.com or call 555-0123-4567.",
        "Contains email and phone number",
        false,
    ),
    case(
        "Payment Issue",
        "I ordered a hat from your store and would like to request a refund. My credit card number is 4111111111111111 ",
        "Contains credit card number",
        false,
    ),
    case(
        "Technical Issue",
        "I can't connect to my home network. My IP is 192.168.1.1 and my router's MAC address is 00:1A:2B:3C:4D:5E",
        "Contains IP address and MAC address",
        false,
    ),
    case(
        "Account Update",
        "Please update my account Phone number: +15559876543",
        "Contains phone number",
        false,
    ),
    case(
        "Mixed Support Request",
        "Having issues with my recent purchase on order #5431.\nContact: alice@example.com\nShipping: 123 Main St, Apt 4B\nCard: 4111-2222-3333-4444\nPhone: +1-555-123-4567",
        "Mix of order info and sensitive data",
        false,
    ),
];

pub const SIGNUP_CASES: &[TestCase] = &[
    case("Valid Gmail", "user@gmail.com", "Standard Gmail address", true),
    case("Valid Business Email", "contact@company.com", "Corporate email address", true),
    case("Valid Custom Domain", "john@mydomain.org", "Email with custom domain", true),
    case(
        "Disposable Email",
        "temp@10minutemail.com",
        "Temporary/disposable email service",
        false,
    ),
    case("Invalid Format", "not-an-email-address", "Incorrectly formatted email", false),
    case(
        "Missing MX Records",
        "user@nonexistent-domain.com",
        "Domain without mail server",
        false,
    ),
    case("Known Spam Domain", "user@spam-domain.xyz", "Domain associated with spam", false),
];

/// Submissions sent by a rapid signup test; one more than the window allows.
pub const RAPID_SIGNUP_ATTEMPTS: usize = 6;

/// Case-insensitive lookup by label.
pub fn find_case(cases: &'static [TestCase], label: &str) -> Option<&'static TestCase> {
    cases.iter().find(|c| c.label.eq_ignore_ascii_case(label))
}

/// A request pattern against the rate-limit route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    pub label: &'static str,
    pub description: &'static str,
    pub requests: usize,
    pub delay: Duration,
}

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        label: "single",
        description: "Make a single request to test basic functionality",
        requests: 1,
        delay: Duration::from_millis(0),
    },
    Scenario {
        label: "burst",
        description: "Make multiple requests quickly to trigger rate limiting",
        requests: 10,
        delay: Duration::from_millis(100),
    },
    Scenario {
        label: "spaced",
        description: "Make requests with delays to test token refill",
        requests: 5,
        delay: Duration::from_millis(2000),
    },
    Scenario {
        label: "overflow",
        description: "Exceed the rate limit to see enforcement",
        requests: 15,
        delay: Duration::from_millis(200),
    },
];

pub fn find_scenario(label: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.label.eq_ignore_ascii_case(label))
}
