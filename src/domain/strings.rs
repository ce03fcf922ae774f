use serde::{Deserialize, Serialize};

/// Identifiers of the localized strings the engine refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringId {
    /// "Pay {amount}"
    PayButtonAmount,
    PayButtonLabel,
    SetupButtonLabel,
    ContinueButtonLabel,
    CardLabel,
    CashAppLabel,
    UsBankAccountLabel,
    InstantDebitsLabel,
    /// "{brand} •••• {last4}"
    SavedCardLabel,
    GenericRemoteFailure,
}

/// A string that is resolved against a localization table at display time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolvableString {
    Literal { value: String },
    Resource { id: StringId, args: Vec<String> },
}

impl ResolvableString {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
        }
    }

    pub fn resource(id: StringId) -> Self {
        Self::Resource {
            id,
            args: Vec::new(),
        }
    }

    pub fn resource_with_args(id: StringId, args: Vec<String>) -> Self {
        Self::Resource { id, args }
    }

    pub fn resolve(&self, resolver: &dyn StringResolver) -> String {
        match self {
            Self::Literal { value } => value.clone(),
            Self::Resource { id, args } => resolver.resolve(*id, args),
        }
    }
}

pub trait StringResolver: Send + Sync {
    fn resolve(&self, id: StringId, args: &[String]) -> String;
}

/// Built-in English table used by the CLI and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnglishStrings;

impl StringResolver for EnglishStrings {
    fn resolve(&self, id: StringId, args: &[String]) -> String {
        let template = match id {
            StringId::PayButtonAmount => "Pay %s",
            StringId::PayButtonLabel => "Pay",
            StringId::SetupButtonLabel => "Set up",
            StringId::ContinueButtonLabel => "Continue",
            StringId::CardLabel => "Card",
            StringId::CashAppLabel => "Cash App Pay",
            StringId::UsBankAccountLabel => "US bank account",
            StringId::InstantDebitsLabel => "Bank",
            StringId::SavedCardLabel => "%s •••• %s",
            StringId::GenericRemoteFailure => "Something went wrong",
        };
        format_template(template, args)
    }
}

/// Substitutes each `%s` in order; missing arguments become empty.
fn format_template(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut pieces = template.split("%s").peekable();
    while let Some(piece) = pieces.next() {
        out.push_str(piece);
        if pieces.peek().is_some()
            && let Some(arg) = args.next()
        {
            out.push_str(arg);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_literal_verbatim() {
        let label = ResolvableString::literal("Buy now");
        assert_eq!(label.resolve(&EnglishStrings), "Buy now");
    }

    #[test]
    fn test_resolves_resource_with_args() {
        let label =
            ResolvableString::resource_with_args(StringId::PayButtonAmount, vec!["$10.99".into()]);
        assert_eq!(label.resolve(&EnglishStrings), "Pay $10.99");

        let saved = ResolvableString::resource_with_args(
            StringId::SavedCardLabel,
            vec!["Visa".into(), "4242".into()],
        );
        assert_eq!(saved.resolve(&EnglishStrings), "Visa •••• 4242");
    }

    #[test]
    fn test_missing_args_are_blank() {
        let label = ResolvableString::resource(StringId::PayButtonAmount);
        assert_eq!(label.resolve(&EnglishStrings), "Pay ");
    }
}
