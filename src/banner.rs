use crate::model::NavLevel;

const NAMESPACE_BANNER: &str = "
███╗   ██╗ █████╗ ███╗   ███╗███████╗███████╗██████╗  █████╗  ██████╗███████╗
████╗  ██║██╔══██╗████╗ ████║██╔════╝██╔════╝██╔══██╗██╔══██╗██╔════╝██╔════╝
██╔██╗ ██║███████║██╔████╔██║█████╗  ███████╗██████╔╝███████║██║     █████╗
██║╚██╗██║██╔══██║██║╚██╔╝██║██╔══╝  ╚════██║██╔═══╝ ██╔══██║██║     ██╔══╝
██║ ╚████║██║  ██║██║ ╚═╝ ██║███████╗███████║██║     ██║  ██║╚██████╗███████╗
╚═╝  ╚═══╝╚═╝  ╚═╝╚═╝     ╚═╝╚══════╝╚══════╝╚═╝     ╚═╝  ╚═╝ ╚═════╝╚══════╝";

const POD_BANNER: &str = "
██████╗  ██████╗ ██████╗
██╔══██╗██╔═══██╗██╔══██╗
██████╔╝██║   ██║██║  ██║
██╔═══╝ ██║   ██║██║  ██║
██║     ╚██████╔╝██████╔╝
╚═╝      ╚═════╝ ╚═════╝";

const CONTAINER_BANNER: &str = "
 ██████╗ ██████╗ ███╗   ██╗████████╗ █████╗ ██╗███╗   ██╗███████╗██████╗
██╔════╝██╔═══██╗████╗  ██║╚══██╔══╝██╔══██╗██║████╗  ██║██╔════╝██╔══██╗
██║     ██║   ██║██╔██╗ ██║   ██║   ███████║██║██╔██╗ ██║█████╗  ██████╔╝
██║     ██║   ██║██║╚██╗██║   ██║   ██╔══██║██║██║╚██╗██║██╔══╝  ██╔══██╗
╚██████╗╚██████╔╝██║ ╚████║   ██║   ██║  ██║██║██║ ╚████║███████╗██║  ██║
 ╚═════╝ ╚═════╝ ╚═╝  ╚═══╝   ╚═╝   ╚═╝  ╚═╝╚═╝╚═╝  ╚═══╝╚══════╝╚═╝  ╚═╝";

/// Blank rows above the banner.
pub const BANNER_MARGIN: u16 = 1;
/// Context line plus the filter/help footer.
pub const CHROME_ROWS: u16 = 3;

pub fn banner_lines(level: NavLevel) -> Vec<&'static str> {
    let raw = match level {
        NavLevel::Namespace => NAMESPACE_BANNER,
        NavLevel::Pod => POD_BANNER,
        NavLevel::Container => CONTAINER_BANNER,
    };
    raw.trim_matches('\n').lines().collect()
}

/// Rows taken by everything above and below the list except the label panel.
pub fn banner_height(level: NavLevel) -> u16 {
    banner_lines(level).len() as u16 + BANNER_MARGIN + CHROME_ROWS
}
