//! Remote attribute and field names of the Directory and Licensing APIs.

pub const ID: &str = "id";
pub const ETAG: &str = "etag";
pub const PRIMARY_EMAIL: &str = "primaryEmail";
pub const EMAIL: &str = "email";
pub const ALIASES: &str = "aliases";
pub const NON_EDITABLE_ALIASES: &str = "nonEditableAliases";

// Account name object and its parts.
pub const NAME: &str = "name";
pub const GIVEN_NAME: &str = "givenName";
pub const FAMILY_NAME: &str = "familyName";
pub const FULL_NAME: &str = "fullName";

// Account scalar fields.
pub const IS_ADMIN: &str = "isAdmin";
pub const IS_DELEGATED_ADMIN: &str = "isDelegatedAdmin";
pub const LAST_LOGIN_TIME: &str = "lastLoginTime";
pub const CREATION_TIME: &str = "creationTime";
pub const DELETION_TIME: &str = "deletionTime";
pub const AGREED_TO_TERMS: &str = "agreedToTerms";
pub const SUSPENDED: &str = "suspended";
pub const SUSPENSION_REASON: &str = "suspensionReason";
pub const CHANGE_PASSWORD_AT_NEXT_LOGIN: &str = "changePasswordAtNextLogin";
pub const IP_WHITELISTED: &str = "ipWhitelisted";
pub const ORG_UNIT_PATH: &str = "orgUnitPath";
pub const IS_MAILBOX_SETUP: &str = "isMailboxSetup";
pub const INCLUDE_IN_GLOBAL_ADDRESS_LIST: &str = "includeInGlobalAddressList";
pub const THUMBNAIL_PHOTO_URL: &str = "thumbnailPhotoUrl";
pub const CUSTOMER_ID: &str = "customerId";
pub const PASSWORD: &str = "password";

// Account structured multi-valued fields.
pub const IMS: &str = "ims";
pub const EMAILS: &str = "emails";
pub const EXTERNAL_IDS: &str = "externalIds";
pub const RELATIONS: &str = "relations";
pub const ADDRESSES: &str = "addresses";
pub const ORGANIZATIONS: &str = "organizations";
pub const PHONES: &str = "phones";
pub const CUSTOM_SCHEMAS: &str = "customSchemas";

// Group fields.
pub const DESCRIPTION: &str = "description";
pub const ADMIN_CREATED: &str = "adminCreated";
pub const DIRECT_MEMBERS_COUNT: &str = "directMembersCount";

// Member fields.
pub const GROUP_KEY: &str = "groupKey";
pub const ALIAS: &str = "alias";
pub const ROLE: &str = "role";
pub const TYPE: &str = "type";
pub const STATUS: &str = "status";
pub const DEFAULT_ROLE: &str = "MEMBER";
/// Member roles requested on listings.
pub const LIST_ROLES: &str = "OWNER,MANAGER,MEMBER";

// Org unit fields.
pub const PARENT_ORG_UNIT_PATH: &str = "parentOrgUnitPath";
pub const BLOCK_INHERITANCE: &str = "blockInheritance";

// License assignment fields.
pub const PRODUCT_ID: &str = "productId";
pub const SKU_ID: &str = "skuId";
pub const USER_ID: &str = "userId";
pub const SELF_LINK: &str = "selfLink";
