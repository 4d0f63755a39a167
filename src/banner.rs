//! Startup banner display.

/// Resolved configuration for display in the startup banner.
pub struct BannerInfo<'a> {
    pub addr: &'a str,
    pub model: &'a str,
    pub advice_auth: &'a str,
    pub store: &'a str,
    pub identity: &'a str,
}

/// Print the startup banner with the resolved setup.
pub fn print_banner(info: &BannerInfo) {
    println!(
        r#"
   ╔═══════════════════════════════════════╗
   ║              B R A W N                ║
   ║   advice and iron, one rep at a time  ║
   ╚═══════════════════════════════════════╝

   version   {}
   listen    {}
   model     {} ({})
   store     {}
   identity  {}
"#,
        env!("CARGO_PKG_VERSION"),
        info.addr,
        info.model,
        info.advice_auth,
        info.store,
        info.identity,
    );
}
