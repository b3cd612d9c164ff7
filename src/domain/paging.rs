use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(Direction::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(Direction::Desc)
        } else {
            None
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub property: String,
    pub direction: Direction,
}

impl Order {
    pub fn asc(property: &str) -> Self {
        Order {
            property: property.to_string(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(property: &str) -> Self {
        Order {
            property: property.to_string(),
            direction: Direction::Desc,
        }
    }

    /// Parses repeated `sort` parameters of the form `prop[,prop...][,asc|desc]`.
    /// A trailing direction applies to every property listed before it in the same value.
    pub fn parse_all<S: AsRef<str>>(values: &[S]) -> Vec<Order> {
        let mut orders = Vec::new();
        for value in values {
            let mut tokens: Vec<&str> = value
                .as_ref()
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect();
            let direction = match tokens.last().and_then(|t| Direction::parse(t)) {
                Some(direction) => {
                    tokens.pop();
                    direction
                }
                None => Direction::Asc,
            };
            orders.extend(tokens.into_iter().map(|property| Order {
                property: property.to_string(),
                direction,
            }));
        }
        orders
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PageDefaults {
    pub default_size: u32,
    pub max_size: u32,
}

impl Default for PageDefaults {
    fn default() -> Self {
        PageDefaults {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Vec<Order>,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        PageRequest {
            page,
            size: size.max(1),
            sort: Vec::new(),
        }
    }

    pub fn sorted(mut self, order: Order) -> Self {
        self.sort.push(order);
        self
    }

    /// Builds a request from raw query values. Unparseable or out of range
    /// numbers fall back to the defaults instead of failing.
    pub fn from_params(
        page: Option<&str>,
        size: Option<&str>,
        sort: &[String],
        defaults: PageDefaults,
    ) -> Self {
        let page = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .map(|p| p.clamp(0, u32::MAX as i64) as u32)
            .unwrap_or(0);
        let size = match size.and_then(|s| s.trim().parse::<i64>().ok()) {
            Some(s) if s >= 1 => (s.min(defaults.max_size as i64)) as u32,
            _ => defaults.default_size,
        };
        PageRequest {
            page,
            size,
            sort: Order::parse_all(sort),
        }
    }

    pub fn offset(&self) -> u64 {
        self.page as u64 * self.size as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(0, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        Page {
            content,
            number: request.page,
            size: request.size,
            total_elements,
        }
    }

    pub fn empty(request: &PageRequest) -> Self {
        Page::new(Vec::new(), request, 0)
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 1;
        }
        self.total_elements.div_ceil(self.size as u64)
    }

    pub fn has_next(&self) -> bool {
        (self.number as u64 + 1) < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}
