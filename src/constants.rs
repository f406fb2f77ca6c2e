/// Vendor, source and file name constants to ensure consistency across the codebase

// Canonical vendor labels (catalog map keys)
pub const INTEL_VENDOR: &str = "Intel";
pub const AMD_VENDOR: &str = "AMD";

// Official Windows 11 compatibility lists, one page per platform
pub const AMD_COMPATIBILITY_URL: &str = "https://docs.microsoft.com/en-us/windows-hardware/design/minimum/supported/windows-11-supported-amd-processors";
pub const INTEL_COMPATIBILITY_URL: &str = "https://docs.microsoft.com/en-us/windows-hardware/design/minimum/supported/windows-11-supported-intel-processors";
pub const QUALCOMM_COMPATIBILITY_URL: &str = "https://docs.microsoft.com/en-us/windows-hardware/design/minimum/supported/windows-11-supported-qualcomm-processors";

// Intel ARK
pub const INTEL_PROCESSORS_URL: &str = "https://ark.intel.com/content/www/us/en/ark.html#@Processors";
pub const INTEL_SEARCH_URL: &str = "https://ark.intel.com/content/www/us/en/ark/search.html?_charset_=UTF-8&q={}";

/// Product panels on the ARK processors page: Core, Pentium, Celeron, Xeon,
/// Xeon Phi, Itanium and Atom
pub const INTEL_PANEL_KEYS: [&str; 7] = [
    "PanelLabel122139",
    "PanelLabel29862",
    "PanelLabel43521",
    "PanelLabel595",
    "PanelLabel75557",
    "PanelLabel451",
    "PanelLabel29035",
];

// AMD product specifications
pub const AMD_PROCESSORS_URL: &str = "https://www.amd.com/en/products/specifications/processors";
pub const AMD_PRODUCT_URL: &str = "https://www.amd.com/en/product/{}";

// amd.com is very picky on User-Agent
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:92.0) Gecko/20100101 Firefox/92.0";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 15;
// AMD's gateway blocks addresses that crawl too fast
pub const DEFAULT_AMD_DELAY_MS: u64 = 1500;

// Staged data files
pub const COMPATIBILITY_FILENAME: &str = "compatibility-lists.json";
pub const INTEL_FILENAME: &str = "intel-cpus.json";
pub const AMD_FILENAME: &str = "amd-cpus.json";
pub const ALL_VENDORS_FILENAME: &str = "all-vendors-cpus.json";
pub const ALL_VENDORS_WIP_FILENAME: &str = "all-vendors-cpus-work-in-progress.json";

// Export files
pub const EXPORT_JSON_FILENAME: &str = "cpus.json";
pub const EXPORT_METRICS_FILENAME: &str = "metrics.prom";

/// Substitute `{}` in a URL template
pub fn fill_template(template: &str, value: &str) -> String {
    template.replacen("{}", value, 1)
}

/// Get all compatibility list URLs in scrape order
pub fn get_compatibility_urls() -> Vec<&'static str> {
    vec![
        AMD_COMPATIBILITY_URL,
        INTEL_COMPATIBILITY_URL,
        QUALCOMM_COMPATIBILITY_URL,
    ]
}
