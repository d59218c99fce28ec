//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// User Roles
// =============================================================================

/// Service consumer role, assigned to every new user
pub const ROLE_CLIENT: &str = "CLIENT";

/// Service provider role
pub const ROLE_CONTRACTOR: &str = "CONTRACTOR";

/// Administrator role with moderation privileges
pub const ROLE_ADMIN: &str = "ADMIN";

/// All valid role values
pub const VALID_ROLES: &[&str] = &[ROLE_CLIENT, ROLE_CONTRACTOR, ROLE_ADMIN];

/// Check if a role value is valid
pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.contains(&role)
}

// =============================================================================
// User Profiles and Addresses
// =============================================================================

/// Display name length bounds (characters, after trimming)
pub const USER_NAME_MIN_LENGTH: usize = 1;
pub const USER_NAME_MAX_LENGTH: usize = 100;

/// Mexican phone numbers are stored as exactly ten digits
pub const PHONE_DIGITS: usize = 10;

/// Street line bounds for client addresses
pub const ADDRESS_LINE_MIN_LENGTH: usize = 5;
pub const ADDRESS_LINE_MAX_LENGTH: usize = 200;

/// City and state bounds for client addresses
pub const ADDRESS_REGION_MIN_LENGTH: usize = 2;
pub const ADDRESS_REGION_MAX_LENGTH: usize = 100;

/// Client addresses are domestic only
pub const USER_ADDRESS_COUNTRY: &str = "MX";

// =============================================================================
// Passwords
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

// =============================================================================
// Services
// =============================================================================

/// Title length bounds (characters, after trimming)
pub const SERVICE_TITLE_MIN_LENGTH: usize = 5;
pub const SERVICE_TITLE_MAX_LENGTH: usize = 100;

/// Description length bounds (characters, after trimming)
pub const SERVICE_DESCRIPTION_MIN_LENGTH: usize = 50;
pub const SERVICE_DESCRIPTION_MAX_LENGTH: usize = 2000;

/// Price bounds in MXN cents (50.00 to 50,000.00 MXN)
pub const SERVICE_MIN_PRICE_CENTS: i64 = 5_000;
pub const SERVICE_MAX_PRICE_CENTS: i64 = 5_000_000;

/// Duration bounds in minutes (30 minutes to 8 hours)
pub const SERVICE_MIN_DURATION_MINUTES: i32 = 30;
pub const SERVICE_MAX_DURATION_MINUTES: i32 = 480;

/// Currency used for every listing
pub const DEFAULT_CURRENCY: &str = "MXN";

// =============================================================================
// Service Images
// =============================================================================

/// Maximum number of images attached to a single service
pub const MAX_IMAGES_PER_SERVICE: u64 = 5;

/// Image dimension bounds in pixels
pub const IMAGE_MIN_DIMENSION: i32 = 100;
pub const IMAGE_MAX_DIMENSION: i32 = 10_000;

// =============================================================================
// Contractor Location
// =============================================================================

/// Decimal places kept in coordinates shown to non-owners (~1 km)
pub const PUBLIC_COORDINATE_DECIMALS: i32 = 2;

/// Service radius bounds in kilometers
pub const MIN_SERVICE_RADIUS_KM: i32 = 1;
pub const MAX_SERVICE_RADIUS_KM: i32 = 100;

/// Countries where contractors can operate (ISO 3166-1 alpha-2)
pub const SUPPORTED_COUNTRIES: &[&str] = &["MX", "US", "CO", "PE", "AR"];

/// Check if a country code is supported
pub fn is_supported_country(code: &str) -> bool {
    SUPPORTED_COUNTRIES.contains(&code)
}

// =============================================================================
// Bookings
// =============================================================================

/// Booking statuses that block archiving a service
pub const ACTIVE_BOOKING_STATUSES: &[&str] = &["PENDING", "CONFIRMED", "IN_PROGRESS"];
