//! Swap route coherence checks

use std::fmt;
use strategy_forge_types::{addresses_equal, is_valid_address, SwapRoute};

/// Sub-field of a [`SwapRoute`] an error is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteField {
    From,
    To,
    Path,
}

impl RouteField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteField::From => "from",
            RouteField::To => "to",
            RouteField::Path => "path",
        }
    }
}

impl fmt::Display for RouteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What made a route incoherent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteErrorKind {
    /// A route address is not `0x` + 40 hex digits
    InvalidAddress,
    /// An endpoint differs from the one the strategy requires
    UnexpectedEndpoint,
    /// The path is empty or does not join `from` to `to`
    BrokenPath,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct RouteValidationError {
    pub kind: RouteErrorKind,
    pub field: RouteField,
    pub message: String,
}

impl RouteValidationError {
    fn new(kind: RouteErrorKind, field: RouteField, message: impl Into<String>) -> Self {
        Self {
            kind,
            field,
            message: message.into(),
        }
    }
}

/// Validate one route against the endpoints it must connect.
///
/// `expected_to` is only supplied for legs with a fixed destination (the
/// native token leg). Addresses are compared ignoring letter case.
pub fn validate_route(
    route: &SwapRoute,
    expected_from: &str,
    expected_to: Option<&str>,
) -> Result<(), RouteValidationError> {
    if !is_valid_address(&route.from) {
        return Err(RouteValidationError::new(
            RouteErrorKind::InvalidAddress,
            RouteField::From,
            format!("invalid address '{}'", route.from),
        ));
    }

    if !is_valid_address(&route.to) {
        return Err(RouteValidationError::new(
            RouteErrorKind::InvalidAddress,
            RouteField::To,
            format!("invalid address '{}'", route.to),
        ));
    }

    if let Some((idx, hop)) = route
        .path
        .iter()
        .enumerate()
        .find(|(_, hop)| !is_valid_address(hop))
    {
        return Err(RouteValidationError::new(
            RouteErrorKind::InvalidAddress,
            RouteField::Path,
            format!("invalid address '{hop}' at path[{idx}]"),
        ));
    }

    if !addresses_equal(&route.from, expected_from) {
        return Err(RouteValidationError::new(
            RouteErrorKind::UnexpectedEndpoint,
            RouteField::From,
            format!("from must be {expected_from}, got {}", route.from),
        ));
    }

    if let Some(expected_to) = expected_to {
        if !addresses_equal(&route.to, expected_to) {
            return Err(RouteValidationError::new(
                RouteErrorKind::UnexpectedEndpoint,
                RouteField::To,
                format!("to must be {expected_to}, got {}", route.to),
            ));
        }
    }

    let (first, last) = match (route.path.first(), route.path.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(RouteValidationError::new(
                RouteErrorKind::BrokenPath,
                RouteField::Path,
                "path must not be empty",
            ))
        }
    };

    if !addresses_equal(first, &route.from) {
        return Err(RouteValidationError::new(
            RouteErrorKind::BrokenPath,
            RouteField::Path,
            format!("path must start with from address {}, got {first}", route.from),
        ));
    }

    if !addresses_equal(last, &route.to) {
        return Err(RouteValidationError::new(
            RouteErrorKind::BrokenPath,
            RouteField::Path,
            format!("path must end with to address {}, got {last}", route.to),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strategy_forge_types::NATIVE_TOKEN_SENTINEL;

    const REWARD: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const TOKEN0: &str = "0x1111111111111111111111111111111111111111";
    const WETH: &str = "0x4200000000000000000000000000000000000006";

    #[test]
    fn test_valid_multi_hop_route() {
        let route = SwapRoute::new(
            REWARD,
            TOKEN0,
            vec![REWARD.to_string(), WETH.to_string(), TOKEN0.to_string()],
        );
        assert!(validate_route(&route, REWARD, None).is_ok());
    }

    #[test]
    fn test_comparison_ignores_case() {
        let upper = REWARD.to_uppercase().replacen("0X", "0x", 1);
        let route = SwapRoute::new(
            upper.clone(),
            NATIVE_TOKEN_SENTINEL,
            vec![REWARD.to_string(), NATIVE_TOKEN_SENTINEL.to_lowercase()],
        );
        assert!(validate_route(&route, REWARD, Some(NATIVE_TOKEN_SENTINEL)).is_ok());
    }

    #[test]
    fn test_invalid_addresses_name_their_field() {
        let route = SwapRoute::direct("0x123", TOKEN0);
        let err = validate_route(&route, REWARD, None).unwrap_err();
        assert_eq!(err.field, RouteField::From);
        assert_eq!(err.kind, RouteErrorKind::InvalidAddress);

        let route = SwapRoute::direct(REWARD, "token0");
        assert_eq!(
            validate_route(&route, REWARD, None).unwrap_err().field,
            RouteField::To
        );

        let route = SwapRoute::new(
            REWARD,
            TOKEN0,
            vec![REWARD.to_string(), "0xnothex".to_string(), TOKEN0.to_string()],
        );
        let err = validate_route(&route, REWARD, None).unwrap_err();
        assert_eq!(err.field, RouteField::Path);
        assert!(err.message.contains("path[1]"));
    }

    #[test]
    fn test_unexpected_endpoints() {
        let route = SwapRoute::direct(TOKEN0, WETH);
        let err = validate_route(&route, REWARD, None).unwrap_err();
        assert_eq!(err.field, RouteField::From);
        assert_eq!(err.kind, RouteErrorKind::UnexpectedEndpoint);

        let route = SwapRoute::direct(REWARD, WETH);
        let err = validate_route(&route, REWARD, Some(NATIVE_TOKEN_SENTINEL)).unwrap_err();
        assert_eq!(err.field, RouteField::To);
    }

    #[test]
    fn test_broken_paths() {
        let route = SwapRoute::new(REWARD, TOKEN0, vec![]);
        let err = validate_route(&route, REWARD, None).unwrap_err();
        assert_eq!(err.field, RouteField::Path);
        assert!(err.message.contains("must not be empty"));

        let route = SwapRoute::new(REWARD, TOKEN0, vec![WETH.to_string(), TOKEN0.to_string()]);
        let err = validate_route(&route, REWARD, None).unwrap_err();
        assert_eq!(err.kind, RouteErrorKind::BrokenPath);
        assert!(err.message.contains("must start with from address"));

        let route = SwapRoute::new(REWARD, TOKEN0, vec![REWARD.to_string(), WETH.to_string()]);
        let err = validate_route(&route, REWARD, None).unwrap_err();
        assert!(err.message.contains("must end with to address"));
    }
}
