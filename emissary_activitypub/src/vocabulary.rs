// Activity types
pub const ACCEPT: &str = "Accept";
pub const ANNOUNCE: &str = "Announce";
pub const BLOCK: &str = "Block";
pub const CREATE: &str = "Create";
pub const DELETE: &str = "Delete";
pub const DISLIKE: &str = "Dislike";
pub const FOLLOW: &str = "Follow";
pub const LIKE: &str = "Like";
pub const MOVE: &str = "Move";
pub const UNDO: &str = "Undo";
pub const UPDATE: &str = "Update";

// Actor types
pub const APPLICATION: &str = "Application";
pub const GROUP: &str = "Group";
pub const ORGANIZATION: &str = "Organization";
pub const PERSON: &str = "Person";
pub const SERVICE: &str = "Service";

// Object types
pub const ARTICLE: &str = "Article";
pub const EVENT: &str = "Event";
pub const NOTE: &str = "Note";
pub const PAGE: &str = "Page";
pub const PLACE: &str = "Place";
pub const PROFILE: &str = "Profile";
pub const RELATIONSHIP: &str = "Relationship";
pub const TOMBSTONE: &str = "Tombstone";

// Collections
pub const ORDERED_COLLECTION: &str = "OrderedCollection";
pub const ORDERED_COLLECTION_PAGE: &str = "OrderedCollectionPage";

// MLS over ActivityPub
pub const GROUP_INFO: &str = "GroupInfo";
pub const KEY_PACKAGE: &str = "KeyPackage";
pub const PRIVATE_MESSAGE: &str = "PrivateMessage";
pub const PUBLIC_MESSAGE: &str = "PublicMessage";
pub const WELCOME: &str = "Welcome";
