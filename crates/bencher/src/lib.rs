//! Shared inputs for the benchmarks.

#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    input: TestInput,
}

impl TestCase {
    pub const fn new(name: &'static str, input: TestInput) -> Self {
        Self { name, input }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn input(&self) -> &TestInput {
        &self.input
    }
}

/// A raw input, with the content type needed to decode it when it is a body
#[derive(Debug, Copy, Clone)]
pub struct TestInput {
    content_type: Option<&'static str>,
    content: &'static str,
}

impl TestInput {
    pub const fn new(content: &'static str) -> Self {
        Self { content_type: None, content }
    }

    pub const fn with_content_type(content_type: &'static str, content: &'static str) -> Self {
        Self { content_type: Some(content_type), content }
    }

    pub fn content_type(&self) -> Option<&'static str> {
        self.content_type
    }

    pub fn content(&self) -> &'static str {
        self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

pub static SMALL_REQUEST: TestInput = TestInput::new(
    "GET /index.html HTTP/1.1\r\nHost: 127.0.0.1:8080\r\nUser-Agent: curl/7.79.1\r\nAccept: */*\r\n\r\n",
);

pub static FORM_REQUEST: TestInput = TestInput::new(concat!(
    "POST /login?next=%2Fhome HTTP/1.1\r\n",
    "Host: 127.0.0.1:8080\r\n",
    "Connection: keep-alive\r\n",
    "Cache-Control: max-age=0\r\n",
    "Upgrade-Insecure-Requests: 1\r\n",
    "User-Agent: Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko)\r\n",
    "Accept: text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8\r\n",
    "Accept-Encoding: gzip, deflate, br\r\n",
    "Accept-Language: zh-CN,zh;q=0.9,en;q=0.8\r\n",
    "Cookie: session=9f86d081884c7d65; theme=dark; lang=en\r\n",
    "Content-Type: application/x-www-form-urlencoded\r\n",
    "Content-Length: 43\r\n",
    "\r\n",
    "user=ann&password=s3cr3t&remember=1&tab=all",
));

pub static URLENCODED_BODY: TestInput = TestInput::with_content_type(
    "application/x-www-form-urlencoded",
    "user=ann&password=s3cr3t&remember=1&tag=a&tag=b&tag=c&note=hello%20world%21&city=K%C3%B6ln",
);

pub static MULTIPART_BODY: TestInput = TestInput::with_content_type(
    "multipart/form-data; boundary=X-BOUNDARY",
    concat!(
        "--X-BOUNDARY\r\n",
        "Content-Disposition: form-data; name=\"title\"\r\n",
        "\r\n",
        "holiday\r\n",
        "--X-BOUNDARY\r\n",
        "Content-Disposition: form-data; name=\"description\"\r\n",
        "\r\n",
        "two weeks by the sea, mostly sunny\r\n",
        "--X-BOUNDARY\r\n",
        "Content-Disposition: form-data; name=\"photo\"; filename=\"beach.txt\"\r\n",
        "Content-Type: text/plain\r\n",
        "\r\n",
        "sand sand sand sand sand sand sand sand sand sand sand sand sand sand sand sand\r\n",
        "water water water water water water water water water water water water water\r\n",
        "--X-BOUNDARY--\r\n",
    ),
);
