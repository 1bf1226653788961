//! Built-in seed content shown until the remote store or cache has data.

use super::types::{
  FaqItem, PortfolioItem, PricingPlan, ProjectKind, PublishStatus, ReviewStatus, Service,
  ServiceStatus, SiteSettings, Testimonial,
};

pub const SITE_NAME: &str = "RIDDHAAN";
pub const WHATSAPP_NUMBER: &str = "919521207156";

pub fn settings() -> SiteSettings {
  SiteSettings {
    id: None,
    site_name: SITE_NAME.to_string(),
    tagline: "Websites that grow your business".to_string(),
    whatsapp_number: Some(WHATSAPP_NUMBER.to_string()),
    ..SiteSettings::default()
  }
}

fn service(id: &str, title: &str, description: &str, icon: &str) -> Service {
  Service {
    id: Some(id.to_string()),
    title: title.to_string(),
    description: description.to_string(),
    icon: icon.to_string(),
    status: ServiceStatus::Active,
  }
}

pub fn services() -> Vec<Service> {
  vec![
    service(
      "webdev",
      "Custom Website Development",
      "Custom websites built with React, JavaScript & Tailwind: responsive, fast, and tailored to your brand.",
      "Layout",
    ),
    service(
      "responsive",
      "Mobile-First Design",
      "Websites designed for mobile users first, with fast loading and smooth UX on every device.",
      "Smartphone",
    ),
    service(
      "ecommerce",
      "E-Commerce Solutions",
      "Secure, scalable online stores with product catalogs, payment gateways and inventory management.",
      "ShoppingCart",
    ),
    service(
      "seo",
      "SEO & Performance",
      "Technical SEO, code refinement and performance tuning for top rankings and fast pages.",
      "Search",
    ),
    service(
      "maintenance",
      "Maintenance & Support",
      "Regular updates, backups, and security checks to keep your business running smooth.",
      "ShieldCheck",
    ),
    service(
      "cms",
      "CMS Integration",
      "Easy-to-use admin panels allowing you to update text and images without coding.",
      "Database",
    ),
  ]
}

pub fn portfolio() -> Vec<PortfolioItem> {
  vec![
    PortfolioItem {
      id: Some("1".to_string()),
      title: "ReelMaster".to_string(),
      category: "Digital Product Selling".to_string(),
      image: "https://i.postimg.cc/nhxBXB7z/1000170217.jpg".to_string(),
      description: "A storefront for social media reel bundles with an integrated payment gateway."
        .to_string(),
      link: Some("https://reelmaster.vercel.app/".to_string()),
      status: PublishStatus::Published,
      project_type: Some(ProjectKind::Real),
    },
    PortfolioItem {
      id: Some("2".to_string()),
      title: "PixelSpark".to_string(),
      category: "Cafe and Restaurant".to_string(),
      image: "https://i.postimg.cc/ryjRr7Pf/a-iss-image-ko-4k-or-h.jpg".to_string(),
      description: "A restaurant and cafe landing page with a food ordering simulation.".to_string(),
      link: Some("http://restaurant-cafe-55.netlify.app/".to_string()),
      status: PublishStatus::Published,
      project_type: Some(ProjectKind::Demo),
    },
  ]
}

pub fn testimonials() -> Vec<Testimonial> {
  vec![Testimonial {
    id: Some("1".to_string()),
    name: "ReelMaster".to_string(),
    role: "Digital Product Selling".to_string(),
    content: "The website has helped me get 30% more small creators. Very professional service!"
      .to_string(),
    avatar: "https://i.postimg.cc/BZKX0by0/eh2mxvk9xxrmy0cvkqy9fy3h84.png".to_string(),
    rating: 5,
    status: ReviewStatus::Approved,
  }]
}

fn faq(id: &str, question: &str, answer: &str) -> FaqItem {
  FaqItem {
    id: Some(id.to_string()),
    question: question.to_string(),
    answer: answer.to_string(),
  }
}

pub fn faqs() -> Vec<FaqItem> {
  vec![
    faq(
      "1",
      "How long does it take to build a website?",
      "A basic landing page can be delivered in 3-5 days, while a standard business website takes 7-10 days.",
    ),
    faq(
      "2",
      "Do you provide hosting and domain services?",
      "We help you set up hosting and a domain and recommend providers that fit your budget.",
    ),
    faq(
      "3",
      "Will my website be mobile-responsive?",
      "Yes. Every website is built mobile-first and works on smartphones, tablets, and desktops.",
    ),
    faq(
      "4",
      "What is the payment process?",
      "Typically 50% in advance to start the project and the remaining 50% on completion.",
    ),
    faq(
      "5",
      "Do you offer post-launch support?",
      "Yes, free support is included for 15 days to 6 months depending on your plan.",
    ),
  ]
}

fn plan(id: &str, name: &str, price: &str, pages: &str, features: &[&str], popular: bool) -> PricingPlan {
  PricingPlan {
    id: Some(id.to_string()),
    name: name.to_string(),
    price: price.to_string(),
    pages: pages.to_string(),
    features: features.iter().map(|f| f.to_string()).collect(),
    is_popular: popular,
    color: None,
  }
}

pub fn pricing() -> Vec<PricingPlan> {
  vec![
    plan(
      "basic",
      "BASIC PLAN",
      "₹2,999",
      "3-4 Pages",
      &[
        "Responsive Design",
        "Simple Custom UI",
        "WhatsApp Integration",
        "Contact Form",
        "Basic SEO Structure",
        "Delivery in 3-5 Days",
      ],
      false,
    ),
    plan(
      "standard",
      "STANDARD PLAN",
      "₹5,999",
      "8-10 Pages",
      &[
        "Professional Custom Design",
        "Mobile & Desktop Responsive",
        "Easy Admin Panel (CMS)",
        "WhatsApp, Call & Enquiry",
        "SEO-Ready Structure",
        "Fast Loading Speed",
        "Delivery in 7-10 Days",
      ],
      true,
    ),
    plan(
      "premium",
      "PREMIUM PLAN",
      "₹9,999",
      "Up to 30 Pages",
      &[
        "Advanced CMS Controls",
        "Performance Optimization",
        "Enhanced Security",
        "Portfolio Management",
        "Priority Support",
        "Hosting Setup Assistance",
        "Delivery in 14-20 Days",
      ],
      false,
    ),
  ]
}
